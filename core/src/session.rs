use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-session conversation state. One value per interactive user; it is
/// passed explicitly to every operation that reads or updates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub messages: Vec<ChatMessage>,
    pub summary: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears history and summary. Called whenever a new batch is summarized.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.summary = None;
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }

    /// Installs a fresh summary as the opening assistant message.
    pub fn start_with_summary(&mut self, summary: String) {
        self.messages = vec![ChatMessage::assistant(summary.clone())];
        self.summary = Some(summary);
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn pop_last_if(&mut self, role: ChatRole) -> Option<ChatMessage> {
        if self.messages.last().map(|m| m.role) == Some(role) {
            self.messages.pop()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_with_summary_replaces_history() {
        let mut session = SessionContext::new();
        session.push(ChatMessage::user("stale question"));

        session.start_with_summary("Findings: anemia".to_string());

        assert_eq!(session.summary(), Some("Findings: anemia"));
        assert_eq!(session.messages, vec![ChatMessage::assistant("Findings: anemia")]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = SessionContext::new();
        session.start_with_summary("summary".to_string());
        session.push(ChatMessage::user("why?"));

        session.reset();

        assert!(session.messages.is_empty());
        assert!(!session.has_summary());
    }

    #[test]
    fn test_pop_last_if_checks_role() {
        let mut session = SessionContext::new();
        session.start_with_summary("summary".to_string());

        assert!(session.pop_last_if(ChatRole::User).is_none());
        session.push(ChatMessage::user("question"));
        assert_eq!(
            session.pop_last_if(ChatRole::User),
            Some(ChatMessage::user("question"))
        );
        assert_eq!(session.messages.len(), 1);
    }
}
