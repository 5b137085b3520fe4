use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

/// Assistant message shown when the gateway cannot be reached.
pub const CONNECTION_DISRUPTED_REPLY: &str = "The cosmic connection seems disrupted right now. Please check your internet connection and try again. The stars will align soon. ✨";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// The canned reply used when the gateway fails.
    pub fn connection_disrupted() -> Self {
        Self::assistant(CONNECTION_DISRUPTED_REPLY)
    }
}

/// The trailing `n` messages, oldest first.
pub fn recent_context(messages: &[ChatMessage], n: usize) -> &[ChatMessage] {
    &messages[messages.len().saturating_sub(n)..]
}
