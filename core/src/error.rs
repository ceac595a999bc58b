use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    UnsupportedMedia,
    ExtractionFailed,
    EmptyCorpus,
    FailedPrecondition,
    ServiceUnavailable,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::UnsupportedMedia => "UNSUPPORTED_MEDIA",
            ErrorCode::ExtractionFailed => "EXTRACTION_FAILED",
            ErrorCode::EmptyCorpus => "EMPTY_CORPUS",
            ErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{}", s)
    }
}

pub trait MedbriefError: std::error::Error {
    fn error_code(&self) -> ErrorCode;
}
