pub use medbrief_core::document::SniffedType;
use std::io::{self, Read, Seek, SeekFrom};

/// Classifies a leading byte sample. Pure: the result depends on `sample`
/// alone, never on a file name.
pub fn classify(sample: &[u8]) -> SniffedType {
    if sample.is_empty() {
        return SniffedType::Unsupported;
    }

    // Only the PDF and ZIP signatures are strong enough to trust. Others
    // are a couple of ASCII bytes ("BM", "ID3", "MZ") that ordinary report
    // text can start with, so the text check decides for them.
    if let Some(kind) = infer::get(sample) {
        match kind.mime_type() {
            "application/pdf" => return SniffedType::Pdf,
            "application/zip" => return SniffedType::Zip,
            _ => {}
        }
    }

    if looks_like_text(sample) {
        SniffedType::PlainText
    } else {
        SniffedType::Unsupported
    }
}

/// Reads up to `sniff_len` bytes from the start of `reader`, classifies
/// them and rewinds so the next consumer sees the full content.
pub fn sniff_stream<R: Read + Seek>(reader: &mut R, sniff_len: usize) -> io::Result<SniffedType> {
    reader.seek(SeekFrom::Start(0))?;

    let mut sample = Vec::with_capacity(sniff_len);
    reader.by_ref().take(sniff_len as u64).read_to_end(&mut sample)?;

    let kind = classify(&sample);
    reader.seek(SeekFrom::Start(0))?;
    Ok(kind)
}

fn looks_like_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(text) => mostly_printable(text),
        // A multibyte character cut by the end of the sample is still text.
        Err(e) if e.error_len().is_none() => {
            let valid = &sample[..e.valid_up_to()];
            std::str::from_utf8(valid).map_or(false, |t| t.is_empty() || mostly_printable(t))
        }
        Err(_) => looks_like_legacy_text(sample),
    }
}

fn mostly_printable(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64 > 0.80
}

/// 8-bit encodings such as Latin-1: printable ASCII, whitespace or high
/// bytes, with nothing from the C0 control range.
fn looks_like_legacy_text(sample: &[u8]) -> bool {
    let printable = sample
        .iter()
        .filter(|&&b| matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x20..=0x7E | 0xA0..=0xFF))
        .count();
    printable as f64 / sample.len() as f64 >= 0.90
}
