//! Per-capability role synthesis.
//!
//! For each capability the primary result named as missing, one follow-up
//! completion cycle produces a self-contained Ansible role bundle. Cycles
//! are independent: they run concurrently, a failed cycle is logged and
//! skipped, and the merged output keeps request order regardless of
//! completion order. Partial success is the normal, expected outcome.

use futures::future;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{CompletionClient, CompletionError};
use crate::extract::extract_role_bundle;
use crate::model::{CapabilityRequest, GeneratedFile};
use crate::prompt::PromptComposer;

/// Why a single capability cycle produced nothing.
#[derive(Debug, Error)]
enum SynthesisError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("no usable role bundle in the model response")]
    UnusableBundle,

    #[error("failed to render role prompt: {0}")]
    Prompt(#[from] minijinja::Error),
}

/// Expands capability requests into namespaced role file bundles.
pub struct RoleSynthesizer<'a> {
    client: &'a dyn CompletionClient,
}

impl<'a> RoleSynthesizer<'a> {
    pub fn new(client: &'a dyn CompletionClient) -> Self {
        Self { client }
    }

    /// Synthesizes a role bundle for each request and concatenates the
    /// results in request order.
    ///
    /// The returned sequence contains only successfully synthesized bundles
    /// and may legitimately be shorter than the request count; no error
    /// escapes this call.
    pub async fn synthesize(
        &self,
        base_prompt: &str,
        requests: &[CapabilityRequest],
    ) -> Vec<GeneratedFile> {
        let cycles = requests
            .iter()
            .map(|request| self.synthesize_one(base_prompt, request));
        let outcomes = future::join_all(cycles).await;

        let mut files = Vec::new();
        for (request, outcome) in requests.iter().zip(outcomes) {
            match outcome {
                Ok(bundle_files) => {
                    debug!(
                        capability = %request.normalized_name(),
                        count = bundle_files.len(),
                        "capability synthesized"
                    );
                    files.extend(bundle_files);
                }
                Err(err) => {
                    warn!(
                        capability = %request.normalized_name(),
                        error = %err,
                        "capability synthesis failed, skipping"
                    );
                }
            }
        }
        files
    }

    async fn synthesize_one(
        &self,
        base_prompt: &str,
        request: &CapabilityRequest,
    ) -> Result<Vec<GeneratedFile>, SynthesisError> {
        let role_name = request.normalized_name();
        let prompt = PromptComposer::compose_role_prompt(base_prompt, request)?;

        let raw = self
            .client
            .complete(&prompt.system_instructions, &prompt.user_message)
            .await?;

        let bundle = extract_role_bundle(&raw).ok_or(SynthesisError::UnusableBundle)?;

        Ok(bundle
            .files
            .iter()
            .filter_map(|(path, content)| {
                let content = content.as_str()?;
                Some(GeneratedFile::new(format!("{role_name}/{path}"), content))
            })
            .collect())
    }
}
