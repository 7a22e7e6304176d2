//! The completion-service boundary.
//!
//! The core only assumes an asynchronous, fallible, text-in/text-out call:
//! system instructions and a user message go in, the model's first text block
//! comes back. [`AnthropicClient`] is the production implementation; tests
//! inject scripted fakes through the [`CompletionClient`] trait.

pub mod anthropic;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;
use std::env;
use thiserror::Error;

/// Errors from the completion-service collaborator.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The API answered with a non-success status.
    #[error("completion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("completion request failed: {0}")]
    Network(String),

    /// The API answered successfully but with no text content block.
    #[error("completion service returned no text content")]
    EmptyResponse,

    /// Startup configuration was incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Process-wide completion-service identity, read-only after startup.
///
/// Constructed once and injected into the client; never ambient global state,
/// so the core stays testable without a real network dependency.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Default model, matching the deployment this generator was built for.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Default generation budget per completion call.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// `ANTHROPIC_API_KEY` is required; `ANTHROPIC_MODEL` optionally
    /// overrides the default model.
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            CompletionError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;
        let model = env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the per-call token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Text-in/text-out seam to the completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one composed prompt and returns the raw model reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}
