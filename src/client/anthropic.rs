//! Claude Messages API client.
//!
//! Posts a system block plus a single user message and returns the first
//! text content block of the reply. Failures are mapped onto
//! [`CompletionError`] and surfaced without retries; retry policy belongs to
//! the caller, not this client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionConfig, CompletionError};

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completion client backed by the Claude (Anthropic) HTTP API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    config: CompletionConfig,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Builds the client from environment variables. See
    /// [`CompletionConfig::from_env`].
    pub fn from_env() -> Result<Self, CompletionError> {
        Ok(Self::new(CompletionConfig::from_env()?))
    }

    /// Overrides the endpoint URL, mainly for integration tests against a
    /// local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let request = CreateMessageRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| CompletionError::Network(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| CompletionError::Network(format!("invalid response body: {err}")))?;

        first_text_block(parsed)
    }
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn first_text_block(response: CreateMessageResponse) -> Result<String, CompletionError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .ok_or(CompletionError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> CompletionError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    CompletionError::Api {
        status: status.as_u16(),
        message,
    }
}
