pub mod assistant;
pub mod export;

pub use assistant::{AssistantError, ReportAssistant, SummaryReport};
pub use export::{summary_path, write_summary, write_transcript, ExportError};
pub use medbrief_core::session::{ChatMessage, ChatRole, SessionContext};
