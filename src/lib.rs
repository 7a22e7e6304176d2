//! `rangegen` - natural-language descriptions in, Ludus range configuration
//! bundles out.
//!
//! The crate forwards a lab description (optionally with uploaded
//! configuration content) to an LLM completion service and turns the reply
//! into a strictly-typed result: deployment YAML, documentation, role
//! manifests, red/blue team suggestions, or a clarification request.
//!
//! The deliberately hard part lives in [`extract`]: the model's reply is
//! free text that is only usually valid JSON, and the recovery layer
//! guarantees a well-formed [`StructuredResult`] no matter how mangled the
//! reply is. Everything else is thin sequencing around it:
//!
//! ```text
//! request -> PromptComposer -> CompletionClient -> extract
//!             -> (RoleSynthesizer x N) -> merged StructuredResult
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use rangegen::{AnthropicClient, Mode, PromptContext, RequestOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AnthropicClient::from_env()?;
//! let orchestrator = RequestOrchestrator::new(client);
//!
//! let context = PromptContext::new(
//!     "A small AD lab: one DC, two Windows 10 workstations, a Debian file server",
//!     Mode::Standard,
//! );
//! let result = orchestrator.handle(&context).await?;
//!
//! if result.needs_clarification() {
//!     // Relay the message to the user and re-prompt with their answer.
//! } else {
//!     for file in result.files() {
//!         println!("{}", file.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod extract;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod synth;

pub use client::{AnthropicClient, CompletionClient, CompletionConfig, CompletionError};
pub use error::GenerateError;
pub use extract::{ExtractionProfile, extract, extract_role_bundle};
pub use model::{
    AnalysisResult, CapabilityRequest, ConfigurationResult, GeneratedFile, Mode, PromptContext,
    RoleBundle, StructuredResult, SuggestionResult, Team,
};
pub use orchestrator::RequestOrchestrator;
pub use prompt::{ComposedPrompt, PromptComposer, resolve_mode};
pub use synth::RoleSynthesizer;
