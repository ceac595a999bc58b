use crate::error::{ExtractionError, ExtractionResult};
use std::io::Read;

/// Reads everything, failing once more than `limit` bytes arrive. Declared
/// sizes (archive headers) are not trusted.
pub fn read_to_limit<R: Read>(reader: R, limit: u64) -> ExtractionResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;

    let size = bytes.len() as u64;
    if size > limit {
        return Err(ExtractionError::TooLarge { size, limit });
    }
    Ok(bytes)
}

/// Decodes the full stream as UTF-8. Invalid sequences fail the document.
pub fn extract_plain_text<R: Read>(mut reader: R) -> ExtractionResult<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_verbatim() {
        let text = "TSH 5.8 mIU/L\r\n\tFree T4 0.7 ng/dL\n";
        assert_eq!(extract_plain_text(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = extract_plain_text(&b"Fi\xE8vre"[..]).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8 { valid_up_to: 2 }));
    }

    #[test]
    fn test_read_to_limit() {
        assert_eq!(read_to_limit(&b"12345"[..], 5).unwrap(), b"12345");
        let err = read_to_limit(&b"123456"[..], 5).unwrap_err();
        assert!(matches!(err, ExtractionError::TooLarge { size: 6, limit: 5 }));
    }
}
