use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// A user-submitted file. The name is only a label; it never decides how
/// the bytes are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Content classification derived from leading bytes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SniffedType {
    PlainText,
    Pdf,
    Zip,
    Unsupported,
}

impl SniffedType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            SniffedType::PlainText => "text/plain",
            SniffedType::Pdf => "application/pdf",
            SniffedType::Zip => "application/zip",
            SniffedType::Unsupported => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for SniffedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum SectionOrigin {
    Upload,
    ArchiveMember { archive: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub source_label: String,
    pub text: String,
    pub origin: SectionOrigin,
}

impl ExtractedSection {
    pub fn upload(source_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            text: text.into(),
            origin: SectionOrigin::Upload,
        }
    }

    pub fn archive_member(
        archive: impl Into<String>,
        member: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_label: member.into(),
            text: text.into(),
            origin: SectionOrigin::ArchiveMember {
                archive: archive.into(),
            },
        }
    }

    /// Appends this section with its delimiters. Archive members carry a
    /// `(from ZIP)` marker on the opening line.
    pub fn render_into(&self, out: &mut String) {
        match &self.origin {
            SectionOrigin::Upload => {
                out.push_str("\n\n--- Start of ");
                out.push_str(&self.source_label);
                out.push_str(" ---\n");
                out.push_str(&self.text);
                out.push_str("\n--- End of ");
                out.push_str(&self.source_label);
                out.push_str(" ---");
            }
            SectionOrigin::ArchiveMember { .. } => {
                out.push_str("\n--- Start of ");
                out.push_str(&self.source_label);
                out.push_str(" (from ZIP) ---\n");
                out.push_str(&self.text);
                out.push_str("\n--- End of ");
                out.push_str(&self.source_label);
                out.push_str(" ---\n");
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 2 * self.source_label.len() + 48);
        self.render_into(&mut out);
        out
    }
}

/// Ordered sections handed to the summarization service as one string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCorpus {
    sections: Vec<ExtractedSection>,
}

impl AggregatedCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: ExtractedSection) {
        self.sections.push(section);
    }

    pub fn extend(&mut self, sections: impl IntoIterator<Item = ExtractedSection>) {
        self.sections.extend(sections);
    }

    pub fn sections(&self) -> &[ExtractedSection] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.render_into(&mut out);
        }
        out
    }
}

pub trait ContentHash {
    fn content_hash(&self) -> String;
}

impl ContentHash for UploadedDocument {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        format!("{:x}", hasher.finalize())
    }
}

impl ContentHash for AggregatedCorpus {
    fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
