//! Request orchestration: compose, complete, extract, expand, merge.
//!
//! One compose and one primary completion per call; there is no internal
//! retry loop. A completion failure is surfaced to the caller, a malformed
//! reply never is (the extractor guarantees a well-formed result), and a
//! clarification request short-circuits before any capability synthesis.

use tracing::debug;

use crate::client::CompletionClient;
use crate::error::GenerateError;
use crate::extract::{self, ExtractionProfile};
use crate::model::{PromptContext, StructuredResult};
use crate::prompt::PromptComposer;
use crate::synth::RoleSynthesizer;

/// Sequences one generation request end to end.
pub struct RequestOrchestrator<C> {
    client: C,
}

impl<C: CompletionClient> RequestOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Handles one request: compose, complete, extract, then expand the
    /// file set when the result names required capabilities.
    ///
    /// Synthesized files are appended after the primary result's files, in
    /// capability-request order.
    pub async fn handle(&self, context: &PromptContext) -> Result<StructuredResult, GenerateError> {
        if context.original_prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let prompt = PromptComposer::compose(context);
        let raw = self
            .client
            .complete(&prompt.system_instructions, &prompt.user_message)
            .await?;

        let profile = ExtractionProfile::for_context(context);
        let mut result = extract::extract(&raw, profile);

        if let StructuredResult::ClarificationNeeded { .. } = result {
            return Ok(result);
        }

        if let StructuredResult::Configuration(config) = &mut result
            && !config.required_capabilities.is_empty()
        {
            debug!(
                capabilities = config.required_capabilities.len(),
                "expanding result with synthesized roles"
            );
            let synthesizer = RoleSynthesizer::new(&self.client);
            let synthesized = synthesizer
                .synthesize(&context.original_prompt, &config.required_capabilities)
                .await;
            // Names stay unique across the merged set; a namespaced file
            // colliding with a primary file is dropped, first wins.
            for file in synthesized {
                if config.files.iter().all(|existing| existing.name != file.name) {
                    config.files.push(file);
                } else {
                    debug!(file = %file.name, "dropping synthesized file with duplicate name");
                }
            }
        }

        Ok(result)
    }
}
