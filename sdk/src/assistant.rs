use ingestion::{Aggregation, DocumentAggregator, IngestionError};
use medbrief_core::config::AppConfig;
use medbrief_core::document::UploadedDocument;
use medbrief_core::error::{ErrorCode, MedbriefError};
use medbrief_core::presentation::{IngestWarning, PresentationSink};
use medbrief_core::session::{ChatMessage, ChatRole, SessionContext};
use slm::prompt::{follow_up_prompt, summary_prompt};
use slm::{GenerationError, OpenAiCompatClient, TextGenerator};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    #[error("summarization failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("no summary yet; summarize a batch of reports first")]
    NoSummary,
    #[error("question must not be empty")]
    EmptyQuestion,
}

impl MedbriefError for AssistantError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AssistantError::Ingestion(e) => e.error_code(),
            AssistantError::Generation(e) => e.error_code(),
            AssistantError::NoSummary => ErrorCode::FailedPrecondition,
            AssistantError::EmptyQuestion => ErrorCode::InvalidArgument,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub summary: String,
    pub sections: usize,
    pub warnings: Vec<IngestWarning>,
}

/// Ingests report batches, asks the generator for a clinical summary and
/// answers follow-up questions against it. Conversation state lives in the
/// caller's `SessionContext`.
pub struct ReportAssistant {
    aggregator: DocumentAggregator,
    generator: Arc<dyn TextGenerator>,
}

impl ReportAssistant {
    pub fn new(aggregator: DocumentAggregator, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            aggregator,
            generator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AssistantError> {
        let client = OpenAiCompatClient::from_config(&config.llm)?;
        info!(endpoint = %client.endpoint(), model = %config.llm.model, "generation client ready");
        Ok(Self::new(
            DocumentAggregator::new(config.ingestion.clone()),
            Arc::new(client),
        ))
    }

    pub fn set_presentation_sink(&mut self, sink: Arc<dyn PresentationSink>) {
        self.aggregator.set_presentation_sink(sink);
    }

    /// Extraction only; nothing is sent to the generator.
    pub fn inspect(&self, documents: &[UploadedDocument]) -> Result<Aggregation, AssistantError> {
        Ok(self.aggregator.aggregate(documents)?)
    }

    /// Starts a new conversation from `documents`. An empty corpus fails
    /// before the session is touched; any other failure leaves it reset.
    pub async fn summarize(
        &self,
        session: &mut SessionContext,
        documents: &[UploadedDocument],
    ) -> Result<SummaryReport, AssistantError> {
        let aggregation = self.aggregator.aggregate(documents)?;
        session.reset();

        let corpus = aggregation.text();
        info!(
            model = self.generator.model_name(),
            sections = aggregation.corpus.len(),
            chars = corpus.len(),
            "requesting summary"
        );
        let summary = match self.generator.generate(&summary_prompt(&corpus)).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summary generation failed");
                return Err(e.into());
            }
        };

        session.start_with_summary(summary.clone());
        Ok(SummaryReport {
            summary,
            sections: aggregation.corpus.len(),
            warnings: aggregation.warnings,
        })
    }

    pub async fn ask(
        &self,
        session: &mut SessionContext,
        question: &str,
    ) -> Result<String, AssistantError> {
        let summary = session.summary().ok_or(AssistantError::NoSummary)?.to_string();
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        session.push(ChatMessage::user(question));
        match self.generator.generate(&follow_up_prompt(&summary, question)).await {
            Ok(answer) => {
                session.push(ChatMessage::assistant(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "follow-up generation failed");
                session.pop_last_if(ChatRole::User);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slm::MockTextGenerator;

    fn assistant(generator: Arc<MockTextGenerator>) -> ReportAssistant {
        ReportAssistant::new(DocumentAggregator::default(), generator)
    }

    #[tokio::test]
    async fn test_ask_requires_summary() {
        let generator = Arc::new(MockTextGenerator::new());
        let mut session = SessionContext::new();

        let err = assistant(generator.clone())
            .ask(&mut session, "What is my LDL?")
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::NoSummary));
        assert_eq!(err.error_code(), ErrorCode::FailedPrecondition);
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let generator = Arc::new(MockTextGenerator::new());
        let mut session = SessionContext::new();
        session.start_with_summary("summary".to_string());

        let err = assistant(generator.clone())
            .ask(&mut session, "   \n")
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), ErrorCode::InvalidArgument);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn test_ingestion_error_code_passes_through() {
        let err = AssistantError::from(IngestionError::EmptyCorpus { warnings: vec![] });
        assert_eq!(err.error_code(), ErrorCode::EmptyCorpus);
    }
}
