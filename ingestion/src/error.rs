use medbrief_core::error::{ErrorCode, MedbriefError};
use medbrief_core::presentation::{IngestWarning, WarningKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid PDF: {0}")]
    InvalidPdf(String),
    #[error("PDF parser aborted on malformed content")]
    PdfPanicked,
    #[error("invalid ZIP archive: {0}")]
    InvalidArchive(String),
    #[error("invalid UTF-8 text at byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },
    #[error("{size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExtractionResult<T = String> = Result<T, ExtractionError>;

impl ExtractionError {
    pub fn warning_kind(&self) -> WarningKind {
        match self {
            ExtractionError::TooLarge { .. } => WarningKind::TooLarge,
            _ => WarningKind::ExtractionFailed,
        }
    }

    pub fn into_warning(self, source: impl Into<String>) -> IngestWarning {
        IngestWarning::new(source, self.warning_kind(), self.to_string())
    }
}

impl From<std::string::FromUtf8Error> for ExtractionError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExtractionError::InvalidUtf8 {
            valid_up_to: err.utf8_error().valid_up_to(),
        }
    }
}

impl MedbriefError for ExtractionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ExtractionError::TooLarge { .. } => ErrorCode::InvalidArgument,
            ExtractionError::Io(_) => ErrorCode::Internal,
            _ => ErrorCode::ExtractionFailed,
        }
    }
}

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("No extractable text found in the uploaded files")]
    EmptyCorpus { warnings: Vec<IngestWarning> },
}

impl MedbriefError for IngestionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            IngestionError::EmptyCorpus { .. } => ErrorCode::EmptyCorpus,
        }
    }
}
