//! Hand-off of session results to files.

use medbrief_core::config::ExportConfig;
use medbrief_core::error::{ErrorCode, MedbriefError};
use medbrief_core::session::SessionContext;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("nothing to export; no summary has been generated")]
    NoSummary,
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MedbriefError for ExportError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ExportError::NoSummary => ErrorCode::FailedPrecondition,
            _ => ErrorCode::Internal,
        }
    }
}

/// Resolves an output target: a directory gets the configured file name.
pub fn summary_path(target: &Path, config: &ExportConfig) -> PathBuf {
    if target.is_dir() {
        target.join(&config.summary_file_name)
    } else {
        target.to_path_buf()
    }
}

/// Writes the session summary as plain text, exactly as generated.
pub fn write_summary(session: &SessionContext, path: &Path) -> Result<(), ExportError> {
    let summary = session.summary().ok_or(ExportError::NoSummary)?;
    create_parent(path)?;
    fs::write(path, summary)?;
    info!(path = %path.display(), chars = summary.len(), "summary exported");
    Ok(())
}

/// Writes the chat history as a pretty-printed JSON array of messages.
pub fn write_transcript(session: &SessionContext, path: &Path) -> Result<(), ExportError> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(&session.messages)?;
    fs::write(path, json)?;
    info!(path = %path.display(), messages = session.messages.len(), "transcript exported");
    Ok(())
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbrief_core::session::{ChatMessage, ChatRole};
    use tempfile::tempdir;

    #[test]
    fn test_summary_written_verbatim() {
        let dir = tempdir().unwrap();
        let mut session = SessionContext::new();
        session.start_with_summary("## Findings\n**LDL 182**".to_string());

        let path = summary_path(dir.path(), &ExportConfig::default());
        write_summary(&session, &path).unwrap();

        assert!(path.ends_with("medical_summary.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "## Findings\n**LDL 182**");
    }

    #[test]
    fn test_summary_requires_summary() {
        let dir = tempdir().unwrap();
        let err = write_summary(&SessionContext::new(), &dir.path().join("s.txt")).unwrap_err();
        assert!(matches!(err, ExportError::NoSummary));
    }

    #[test]
    fn test_transcript_is_json_array() {
        let dir = tempdir().unwrap();
        let mut session = SessionContext::new();
        session.start_with_summary("summary".to_string());
        session.push(ChatMessage::user("Is this serious?"));

        let path = dir.path().join("out/transcript.json");
        write_transcript(&session, &path).unwrap();

        let parsed: Vec<ChatMessage> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].role, ChatRole::User);
    }
}
