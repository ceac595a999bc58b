use crate::document::SniffedType;
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Unsupported,
    ExtractionFailed,
    EmptyText,
    TooLarge,
}

impl WarningKind {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            WarningKind::Unsupported => ErrorCode::UnsupportedMedia,
            WarningKind::ExtractionFailed | WarningKind::EmptyText => ErrorCode::ExtractionFailed,
            WarningKind::TooLarge => ErrorCode::InvalidArgument,
        }
    }
}

/// A non-fatal notice about a document or archive member that was left out
/// of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestWarning {
    pub source: String,
    pub kind: WarningKind,
    pub detail: String,
}

impl IngestWarning {
    pub fn new(source: impl Into<String>, kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind,
            detail: detail.into(),
        }
    }

    pub fn unsupported(source: impl Into<String>) -> Self {
        Self::new(source, WarningKind::Unsupported, "content type not recognized")
    }
}

impl std::fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            WarningKind::Unsupported => write!(f, "Skipped unsupported file type: {}", self.source),
            WarningKind::ExtractionFailed => {
                write!(f, "Error processing {}: {}", self.source, self.detail)
            }
            WarningKind::EmptyText => {
                write!(f, "No extractable text in {}: {}", self.source, self.detail)
            }
            WarningKind::TooLarge => write!(f, "Skipped {}: {}", self.source, self.detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresentationEvent {
    DocumentExtracted {
        name: String,
        kind: SniffedType,
        text: String,
    },
    Warning(IngestWarning),
    CorpusReady {
        sections: usize,
        chars: usize,
    },
    EmptyCorpus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub sequence: u64,
    #[serde(flatten)]
    pub event: PresentationEvent,
}

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("presentation sink lock poisoned")]
    LockPoisoned,
    #[error("presentation io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("presentation serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Receives previews, warnings and the corpus outcome as ingestion runs.
pub trait PresentationSink: Send + Sync {
    fn present(&self, event: PresentationEvent) -> Result<(), PresentationError>;
}

#[derive(Default)]
pub struct InMemoryPresentationSink {
    events: Mutex<Vec<SequencedEvent>>,
    sequence: AtomicU64,
}

impl InMemoryPresentationSink {
    pub fn events(&self) -> Result<Vec<SequencedEvent>, PresentationError> {
        let events = self
            .events
            .lock()
            .map_err(|_| PresentationError::LockPoisoned)?;
        Ok(events.clone())
    }

    pub fn warnings(&self) -> Result<Vec<IngestWarning>, PresentationError> {
        Ok(self
            .events()?
            .into_iter()
            .filter_map(|e| match e.event {
                PresentationEvent::Warning(w) => Some(w),
                _ => None,
            })
            .collect())
    }
}

impl PresentationSink for InMemoryPresentationSink {
    fn present(&self, event: PresentationEvent) -> Result<(), PresentationError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let mut events = self
            .events
            .lock()
            .map_err(|_| PresentationError::LockPoisoned)?;
        events.push(SequencedEvent {
            sequence: next,
            event,
        });
        Ok(())
    }
}

/// Appends one JSON object per event.
pub struct JsonlPresentationSink {
    writer: Mutex<std::fs::File>,
    sequence: AtomicU64,
}

impl JsonlPresentationSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PresentationError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;

        Ok(Self {
            writer: Mutex::new(writer),
            sequence: AtomicU64::new(0),
        })
    }
}

impl PresentationSink for JsonlPresentationSink {
    fn present(&self, event: PresentationEvent) -> Result<(), PresentationError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let line = serde_json::to_string(&SequencedEvent {
            sequence: next,
            event,
        })?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PresentationError::LockPoisoned)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_sink_assigns_sequence() {
        let sink = InMemoryPresentationSink::default();
        sink.present(PresentationEvent::Warning(IngestWarning::unsupported("scan.tiff")))
            .unwrap();
        sink.present(PresentationEvent::EmptyCorpus).unwrap();

        let events = sink.events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(sink.warnings().unwrap().len(), 1);
    }

    #[test]
    fn test_jsonl_sink_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events").join("session.jsonl");
        let sink = JsonlPresentationSink::open(&path).unwrap();

        sink.present(PresentationEvent::DocumentExtracted {
            name: "lipids.txt".to_string(),
            kind: SniffedType::PlainText,
            text: "LDL 190".to_string(),
        })
        .unwrap();
        sink.present(PresentationEvent::CorpusReady {
            sections: 1,
            chars: 42,
        })
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "document_extracted");
        assert_eq!(first["kind"], "plain_text");
        assert_eq!(first["sequence"], 1);
    }

    #[test]
    fn test_warning_display_names_the_source() {
        let warning = IngestWarning::unsupported("photo.heic");
        assert_eq!(warning.to_string(), "Skipped unsupported file type: photo.heic");
    }

    #[test]
    fn test_warning_kind_error_codes() {
        assert_eq!(WarningKind::Unsupported.error_code(), ErrorCode::UnsupportedMedia);
        assert_eq!(WarningKind::EmptyText.error_code(), ErrorCode::ExtractionFailed);
        assert_eq!(WarningKind::TooLarge.error_code(), ErrorCode::InvalidArgument);
    }
}
