use crate::error::{ExtractionError, ExtractionResult};
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Extracts the text of every page, in page order, joined with no separator.
/// Any parse failure fails the whole document; no partial text is returned.
pub fn extract_pdf_text<R: Read>(mut reader: R) -> ExtractionResult<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    extract_pdf_text_from_mem(&bytes)
}

pub fn extract_pdf_text_from_mem(bytes: &[u8]) -> ExtractionResult<String> {
    // pdf-extract panics on some malformed fonts and glyph tables.
    let pages = match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => return Err(ExtractionError::InvalidPdf(e.to_string())),
        Err(_) => return Err(ExtractionError::PdfPanicked),
    };

    debug!(pages = pages.len(), bytes = bytes.len(), "pdf text extracted");
    Ok(pages.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_with_pdf_header_fails() {
        let bytes = b"%PDF-1.4\nthis is not really a pdf\n%%EOF";
        let err = extract_pdf_text_from_mem(bytes).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidPdf(_) | ExtractionError::PdfPanicked
        ));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(extract_pdf_text(std::io::empty()).is_err());
    }
}
