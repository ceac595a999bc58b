//! ZIP archive text extraction.
//!
//! Members are pre-filtered by a case-sensitive `.txt` / `.pdf` suffix, then
//! sniffed by content. A member that fails is reported and skipped; only an
//! unreadable container fails the whole archive.

use crate::error::{ExtractionError, ExtractionResult};
use crate::pdf::extract_pdf_text;
use crate::sniff::{sniff_stream, SniffedType};
use crate::text::{extract_plain_text, read_to_limit};
use medbrief_core::config::IngestionConfig;
use medbrief_core::document::ExtractedSection;
use medbrief_core::presentation::{IngestWarning, WarningKind};
use std::io::{Cursor, Read, Seek};
use tracing::{debug, warn};
use zip::ZipArchive;

const MEMBER_SUFFIXES: [&str; 2] = [".txt", ".pdf"];

/// Member sections in archive listing order, plus notices for members that
/// were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveText {
    pub sections: Vec<ExtractedSection>,
    pub warnings: Vec<IngestWarning>,
}

impl ArchiveText {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.render_into(&mut out);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

enum MemberOutcome {
    Extracted(String),
    Rejected(SniffedType),
    EmptyText,
}

#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    sniff_len: usize,
    max_member_bytes: u64,
}

impl ArchiveExtractor {
    pub fn new(config: &IngestionConfig) -> Self {
        Self {
            sniff_len: config.sniff_len,
            max_member_bytes: config.max_member_bytes,
        }
    }

    pub fn extract<R: Read + Seek>(
        &self,
        archive_name: &str,
        reader: R,
    ) -> ExtractionResult<ArchiveText> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| ExtractionError::InvalidArchive(e.to_string()))?;

        let mut out = ArchiveText::default();
        for index in 0..archive.len() {
            let (name, outcome) = match archive.by_index(index) {
                Ok(mut file) => {
                    let name = file.name().to_string();
                    if file.is_dir() || !has_member_suffix(&name) {
                        debug!(archive = archive_name, member = %name, "member skipped by name");
                        continue;
                    }
                    let outcome = self.extract_member(&mut file);
                    (name, outcome)
                }
                Err(e) => (
                    format!("entry #{index}"),
                    Err(ExtractionError::InvalidArchive(e.to_string())),
                ),
            };

            let source = format!("{name} (in {archive_name})");
            match outcome {
                Ok(MemberOutcome::Extracted(text)) => {
                    debug!(archive = archive_name, member = %name, chars = text.len(), "member extracted");
                    out.sections
                        .push(ExtractedSection::archive_member(archive_name, name, text));
                }
                Ok(MemberOutcome::Rejected(kind)) => {
                    warn!(archive = archive_name, member = %name, %kind, "member content does not match its name");
                    out.warnings.push(IngestWarning::new(
                        source,
                        WarningKind::Unsupported,
                        format!("content sniffed as {kind}"),
                    ));
                }
                Ok(MemberOutcome::EmptyText) => {
                    warn!(archive = archive_name, member = %name, "member has no extractable text");
                    out.warnings.push(IngestWarning::new(
                        source,
                        WarningKind::EmptyText,
                        "PDF contains no text layer",
                    ));
                }
                Err(e) => {
                    warn!(archive = archive_name, member = %name, error = %e, "member extraction failed");
                    out.warnings.push(e.into_warning(source));
                }
            }
        }

        Ok(out)
    }

    fn extract_member<R: Read>(&self, file: &mut R) -> ExtractionResult<MemberOutcome> {
        let bytes = read_to_limit(file, self.max_member_bytes)?;
        let mut member = Cursor::new(bytes);

        match sniff_stream(&mut member, self.sniff_len)? {
            SniffedType::PlainText => Ok(MemberOutcome::Extracted(extract_plain_text(member)?)),
            SniffedType::Pdf => {
                let text = extract_pdf_text(member)?;
                if text.trim().is_empty() {
                    Ok(MemberOutcome::EmptyText)
                } else {
                    Ok(MemberOutcome::Extracted(text))
                }
            }
            other => Ok(MemberOutcome::Rejected(other)),
        }
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new(&IngestionConfig::default())
    }
}

/// Rendered member sections of a ZIP read with default limits.
pub fn extract_zip_text<R: Read + Seek>(archive_name: &str, reader: R) -> ExtractionResult<String> {
    ArchiveExtractor::default()
        .extract(archive_name, reader)
        .map(|text| text.render())
}

fn has_member_suffix(name: &str) -> bool {
    MEMBER_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
