//! OpenRouterGateway - chat completions over OpenRouter's OpenAI-compatible
//! REST API.

use astroai_core::config::OpenRouterSection;
use astroai_core::error::{AstroError, Result};
use astroai_core::gateway::{AiGateway, ContentPart, GatewayMessage, GatewayRequest, MessageContent};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::http_error::{map_http_error, map_transport_error, parse_retry_after};

const SERVICE: &str = "OpenRouter";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// [`AiGateway`] backed by OpenRouter.
#[derive(Clone)]
pub struct OpenRouterGateway {
    client: Client,
    api_key: String,
    endpoint: String,
    referer: Option<String>,
    title: String,
}

impl OpenRouterGateway {
    pub fn new(api_key: impl Into<String>, section: &OpenRouterSection, title: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AstroError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/chat/completions", section.base_url.trim_end_matches('/')),
            referer: section.referer.clone(),
            title: title.into(),
        })
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.title)
            .json(body);
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }

        let response = request
            .send()
            .await
            .map_err(|err| map_transport_error(SERVICE, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenRouter error body".to_string());
            return Err(map_http_error(SERVICE, status, body_text, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            AstroError::upstream(None, format!("Failed to parse OpenRouter response: {err}"), false)
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AiGateway for OpenRouterGateway {
    async fn complete(&self, request: GatewayRequest) -> Result<String> {
        let body = ChatCompletionRequest::from(request);
        tracing::debug!(
            model = %body.model,
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "Sending chat completion"
        );
        self.send_request(&body).await
    }
}

impl std::fmt::Debug for OpenRouterGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterGateway")
            .field("endpoint", &self.endpoint)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

impl From<GatewayRequest> for ChatCompletionRequest {
    fn from(request: GatewayRequest) -> Self {
        let mut messages = Vec::with_capacity(request.history.len() + 1);
        if !request.system_prompt.trim().is_empty() {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: WireContent::Text(request.system_prompt),
            });
        }
        messages.extend(request.history.into_iter().map(WireMessage::from));

        Self {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: WireContent,
}

impl From<GatewayMessage> for WireMessage {
    fn from(message: GatewayMessage) -> Self {
        let content = match message.content {
            MessageContent::Text(text) => WireContent::Text(text),
            MessageContent::Parts(parts) => WireContent::Parts(
                parts
                    .into_iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => WirePart::Text { text },
                        ContentPart::ImageUrl { url } => WirePart::ImageUrl {
                            image_url: ImageUrl { url },
                        },
                    })
                    .collect(),
            ),
        };
        Self {
            role: message.role.to_string(),
            content,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AstroError::upstream(None, "OpenRouter returned no content in the response", false))
}
