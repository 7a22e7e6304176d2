//! Request-level error taxonomy.
//!
//! Malformed model output is deliberately absent from this enum: it is always
//! resolved by the extraction tiers and never surfaces as an error.

use thiserror::Error;

use crate::client::CompletionError;

/// Errors a generation request can surface to the caller.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The caller supplied an empty or whitespace-only prompt. Rejected
    /// before any network call is made.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// The completion service failed. Not retried; the underlying message
    /// is attached for the caller to report.
    #[error("completion service failure: {0}")]
    Completion(#[from] CompletionError),
}
