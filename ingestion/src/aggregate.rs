use crate::archive::ArchiveExtractor;
use crate::error::{ExtractionError, IngestionError};
use crate::pdf::extract_pdf_text;
use crate::sniff::{sniff_stream, SniffedType};
use crate::text::extract_plain_text;
use medbrief_core::config::IngestionConfig;
use medbrief_core::document::{AggregatedCorpus, ContentHash, ExtractedSection, UploadedDocument};
use medbrief_core::presentation::{
    IngestWarning, PresentationEvent, PresentationSink, WarningKind,
};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{info, warn};

/// A non-empty corpus and the notices for every input that was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub corpus: AggregatedCorpus,
    pub warnings: Vec<IngestWarning>,
}

impl Aggregation {
    pub fn text(&self) -> String {
        self.corpus.text()
    }
}

#[derive(Default)]
struct DocumentOutcome {
    sections: Vec<ExtractedSection>,
    warnings: Vec<IngestWarning>,
    preview: Option<(SniffedType, String)>,
}

impl DocumentOutcome {
    fn warning(warning: IngestWarning) -> Self {
        Self {
            warnings: vec![warning],
            ..Default::default()
        }
    }
}

pub struct DocumentAggregator {
    config: IngestionConfig,
    archive: ArchiveExtractor,
    sink: Option<Arc<dyn PresentationSink>>,
}

impl DocumentAggregator {
    pub fn new(config: IngestionConfig) -> Self {
        Self {
            archive: ArchiveExtractor::new(&config),
            config,
            sink: None,
        }
    }

    pub fn set_presentation_sink(&mut self, sink: Arc<dyn PresentationSink>) {
        self.sink = Some(sink);
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Sniffs and extracts every document in order. Individual failures
    /// become warnings; the call only fails when nothing was extracted.
    pub fn aggregate(&self, documents: &[UploadedDocument]) -> Result<Aggregation, IngestionError> {
        let mut aggregation = Aggregation::default();

        for document in documents {
            let outcome = self.process_document(document);

            if let Some((kind, text)) = outcome.preview {
                self.emit(PresentationEvent::DocumentExtracted {
                    name: document.name.clone(),
                    kind,
                    text,
                });
            }
            for warning in &outcome.warnings {
                self.emit(PresentationEvent::Warning(warning.clone()));
            }

            aggregation.corpus.extend(outcome.sections);
            aggregation.warnings.extend(outcome.warnings);
        }

        if aggregation.corpus.is_empty() {
            warn!(
                documents = documents.len(),
                warnings = aggregation.warnings.len(),
                "no extractable text in upload batch"
            );
            self.emit(PresentationEvent::EmptyCorpus);
            return Err(IngestionError::EmptyCorpus {
                warnings: aggregation.warnings,
            });
        }

        let chars = aggregation.corpus.text().len();
        info!(
            documents = documents.len(),
            sections = aggregation.corpus.len(),
            warnings = aggregation.warnings.len(),
            chars,
            "corpus aggregated"
        );
        self.emit(PresentationEvent::CorpusReady {
            sections: aggregation.corpus.len(),
            chars,
        });

        Ok(aggregation)
    }

    fn process_document(&self, document: &UploadedDocument) -> DocumentOutcome {
        let name = document.name.as_str();
        let size = document.len() as u64;
        if size > self.config.max_document_bytes {
            let err = ExtractionError::TooLarge {
                size,
                limit: self.config.max_document_bytes,
            };
            warn!(document = name, error = %err, "document rejected");
            return DocumentOutcome::warning(err.into_warning(name));
        }

        let mut stream = Cursor::new(document.bytes.as_ref());
        let kind = match sniff_stream(&mut stream, self.config.sniff_len) {
            Ok(kind) => kind,
            Err(e) => return DocumentOutcome::warning(ExtractionError::from(e).into_warning(name)),
        };

        let digest = document.content_hash();
        info!(document = name, %kind, bytes = size, digest = &digest[..12], "document sniffed");

        match kind {
            SniffedType::PlainText => match extract_plain_text(stream) {
                Ok(text) => DocumentOutcome {
                    sections: vec![ExtractedSection::upload(name, text.clone())],
                    warnings: Vec::new(),
                    preview: Some((kind, text)),
                },
                Err(e) => self.failed(name, e),
            },
            SniffedType::Pdf => match extract_pdf_text(stream) {
                Ok(text) if text.trim().is_empty() => {
                    warn!(document = name, "pdf has no extractable text");
                    DocumentOutcome::warning(IngestWarning::new(
                        name,
                        WarningKind::EmptyText,
                        "PDF contains no text layer",
                    ))
                }
                Ok(text) => DocumentOutcome {
                    sections: vec![ExtractedSection::upload(name, text.clone())],
                    warnings: Vec::new(),
                    preview: Some((kind, text)),
                },
                Err(e) => self.failed(name, e),
            },
            SniffedType::Zip => match self.archive.extract(name, stream) {
                Ok(archive) => {
                    let mut warnings = archive.warnings;
                    if archive.sections.is_empty() && warnings.is_empty() {
                        warnings.push(IngestWarning::new(
                            name,
                            WarningKind::EmptyText,
                            "archive has no .txt or .pdf members",
                        ));
                    }
                    let preview = if archive.sections.is_empty() {
                        None
                    } else {
                        Some((kind, member_listing(&archive.sections)))
                    };
                    DocumentOutcome {
                        sections: archive.sections,
                        warnings,
                        preview,
                    }
                }
                Err(e) => self.failed(name, e),
            },
            SniffedType::Unsupported => {
                warn!(document = name, "unsupported content type");
                DocumentOutcome::warning(IngestWarning::unsupported(name))
            }
        }
    }

    fn failed(&self, name: &str, err: ExtractionError) -> DocumentOutcome {
        warn!(document = name, error = %err, "extraction failed");
        DocumentOutcome::warning(err.into_warning(name))
    }

    fn emit(&self, event: PresentationEvent) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.present(event) {
                warn!(error = %e, "presentation sink rejected event");
            }
        }
    }
}

impl Default for DocumentAggregator {
    fn default() -> Self {
        Self::new(IngestionConfig::default())
    }
}

/// Aggregates with default limits and no presentation sink.
pub fn aggregate(documents: &[UploadedDocument]) -> Result<Aggregation, IngestionError> {
    DocumentAggregator::default().aggregate(documents)
}

fn member_listing(sections: &[ExtractedSection]) -> String {
    let mut listing = format!("Text extracted from {} file(s) in the archive:", sections.len());
    for section in sections {
        listing.push_str("\n- ");
        listing.push_str(&section.source_label);
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbrief_core::presentation::InMemoryPresentationSink;

    #[test]
    fn test_single_text_document() {
        let docs = vec![UploadedDocument::new("bp.txt", "BP 150/95 mmHg".as_bytes().to_vec())];
        let aggregation = aggregate(&docs).unwrap();

        assert_eq!(
            aggregation.text(),
            "\n\n--- Start of bp.txt ---\nBP 150/95 mmHg\n--- End of bp.txt ---"
        );
        assert!(aggregation.warnings.is_empty());
    }

    #[test]
    fn test_name_does_not_drive_routing() {
        // A ".pdf" name on plain text is still treated as text.
        let docs = vec![UploadedDocument::new("report.pdf", b"Glucose 126 mg/dL".to_vec())];
        let aggregation = aggregate(&docs).unwrap();
        assert!(aggregation.text().contains("Glucose 126 mg/dL"));
    }

    #[test]
    fn test_oversized_document_is_skipped() {
        let config = IngestionConfig {
            max_document_bytes: 8,
            ..IngestionConfig::default()
        };
        let aggregator = DocumentAggregator::new(config);
        let docs = vec![
            UploadedDocument::new("big.txt", b"this text is longer than eight bytes".to_vec()),
            UploadedDocument::new("ok.txt", b"Na 139".to_vec()),
        ];

        let aggregation = aggregator.aggregate(&docs).unwrap();
        assert_eq!(aggregation.corpus.len(), 1);
        assert_eq!(aggregation.warnings.len(), 1);
        assert_eq!(aggregation.warnings[0].kind, WarningKind::TooLarge);
    }

    #[test]
    fn test_sink_receives_preview_warning_and_outcome() {
        let sink = Arc::new(InMemoryPresentationSink::default());
        let mut aggregator = DocumentAggregator::default();
        aggregator.set_presentation_sink(sink.clone());

        let docs = vec![
            UploadedDocument::new("notes.txt", b"K 5.9 mmol/L".to_vec()),
            UploadedDocument::new("image.png", b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec()),
        ];
        aggregator.aggregate(&docs).unwrap();

        let events: Vec<PresentationEvent> =
            sink.events().unwrap().into_iter().map(|e| e.event).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            PresentationEvent::DocumentExtracted { name, kind: SniffedType::PlainText, .. } if name == "notes.txt"
        ));
        assert!(matches!(
            &events[1],
            PresentationEvent::Warning(w) if w.kind == WarningKind::Unsupported && w.source == "image.png"
        ));
        assert!(matches!(events[2], PresentationEvent::CorpusReady { sections: 1, .. }));
    }

    #[test]
    fn test_empty_batch_is_empty_corpus() {
        let err = aggregate(&[]).unwrap_err();
        assert!(matches!(err, IngestionError::EmptyCorpus { ref warnings } if warnings.is_empty()));
    }
}
