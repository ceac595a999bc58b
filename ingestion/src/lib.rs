//! Upload ingestion: content sniffing, per-format text extraction and
//! aggregation of everything into one delimited corpus.

pub mod aggregate;
pub mod archive;
pub mod error;
pub mod pdf;
pub mod sniff;
pub mod text;

pub use aggregate::{aggregate, Aggregation, DocumentAggregator};
pub use archive::{extract_zip_text, ArchiveExtractor, ArchiveText};
pub use error::{ExtractionError, ExtractionResult, IngestionError};
pub use pdf::extract_pdf_text;
pub use sniff::{classify, sniff_stream, SniffedType};
