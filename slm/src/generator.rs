use async_trait::async_trait;
use medbrief_core::error::{ErrorCode, MedbriefError};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("could not reach the generation service: {0}")]
    Connection(String),
    #[error("generation service did not answer within {secs}s")]
    Timeout { secs: u64 },
    #[error("generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("unexpected response from generation service: {0}")]
    ResponseParsing(String),
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("invalid generation client configuration: {0}")]
    Configuration(String),
}

impl MedbriefError for GenerationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GenerationError::Configuration(_) => ErrorCode::InvalidArgument,
            _ => ErrorCode::ServiceUnavailable,
        }
    }
}

/// One-shot text generation. Each call is independent; callers put all the
/// context the model needs into the prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Scripted generator for tests and offline runs. Queued replies are served
/// first; after that every call gets the default reply.
pub struct MockTextGenerator {
    default_reply: String,
    queued: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::with_reply("Mock summary")
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            default_reply: reply.into(),
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.queued).push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, error: GenerationError) {
        lock(&self.queued).push_back(Err(error));
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.queued).pop_front() {
            Some(reply) => reply,
            None => Ok(self.default_reply.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_queue_then_default() {
        let generator = MockTextGenerator::with_reply("fallback");
        generator.push_reply("first");
        generator.push_failure(GenerationError::EmptyResponse);

        assert_eq!(generator.generate("a").await.unwrap(), "first");
        assert_eq!(
            generator.generate("b").await.unwrap_err(),
            GenerationError::EmptyResponse
        );
        assert_eq!(generator.generate("c").await.unwrap(), "fallback");
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GenerationError::Timeout { secs: 5 }.error_code(),
            ErrorCode::ServiceUnavailable
        );
        assert_eq!(
            GenerationError::Configuration("bad url".into()).error_code(),
            ErrorCode::InvalidArgument
        );
    }
}
