//! Upstream collaborators: the AI chat-completions gateway and the daily
//! forecast fetcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::Result;
use crate::forecast::ForecastSign;
use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One part of a mixed text/image message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl GatewayMessage {
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub system_prompt: String,
    pub history: Vec<GatewayMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GatewayRequest {
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history: Vec::new(),
            model: model.into(),
            max_tokens: 1_000,
            temperature: 0.7,
        }
    }

    pub fn with_message(mut self, message: GatewayMessage) -> Self {
        self.history.push(message);
        self
    }

    pub fn with_history(mut self, history: impl IntoIterator<Item = GatewayMessage>) -> Self {
        self.history.extend(history);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Chat-completions backend returning the assistant's raw text.
///
/// Non-success responses, transport failures and empty content are all
/// `Err(AstroError::Upstream { .. })`.
#[async_trait]
pub trait AiGateway: Send + Sync {
    async fn complete(&self, request: GatewayRequest) -> Result<String>;
}

/// Source of live daily forecast snippets.
#[async_trait]
pub trait ForecastFetcher: Send + Sync {
    /// Best-effort snippet, `Ok(None)` when the response held nothing usable.
    async fn fetch(&self, sign: ForecastSign, language: Language) -> Result<Option<String>>;
}
