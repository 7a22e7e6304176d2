//! Structured-result recovery from raw model text.
//!
//! The model's output is adversarial only in the sense of being occasionally
//! syntactically invalid free text. The cost of a dead end (retrying the
//! whole request) is much higher than the cost of degraded output, so
//! [`extract`] escalates through tiers instead of failing:
//!
//! 1. Locate the payload (```json fence, any fence, first balanced `{...}`).
//! 2. Parse it directly and map it onto the expected result shape.
//! 3. On parse failure, salvage individual fields out of the broken text.
//! 4. Every salvage path bottoms out in fixed fallback content, so the
//!    caller always receives a well-formed [`StructuredResult`].
//!
//! A `needsClarification: true` flag takes absolute precedence: once seen, no
//! other field is consulted, even if files are also present.

pub(crate) mod core;
pub(crate) mod salvage;

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{
    AnalysisResult, CapabilityRequest, ConfigurationResult, GeneratedFile, Mode, PromptContext,
    RoleBundle, StructuredResult, SuggestionResult, Team,
};

/// The result shape a request expects back, with its team context.
///
/// Drives both the field validation after a direct parse and the fallback
/// content substituted during salvage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionProfile {
    /// Full range generation: `files` plus optional `customRoles`.
    Generation,
    /// Red/blue team suggestion pass: `suggestions` plus optional `files`.
    Suggestion(Team),
    /// Upload analysis: `analysis`, `suggestions` and `files`.
    Analysis,
}

impl ExtractionProfile {
    /// Maps a request context onto the result shape its prompt asks for.
    pub fn for_context(context: &PromptContext) -> Self {
        match context.mode {
            Mode::Standard if context.attached_file_content.is_some() => {
                ExtractionProfile::Analysis
            }
            Mode::Standard => ExtractionProfile::Generation,
            Mode::RedTeam => ExtractionProfile::Suggestion(Team::Red),
            Mode::BlueTeam => ExtractionProfile::Suggestion(Team::Blue),
            Mode::FeatureImplementation(team) => ExtractionProfile::Suggestion(team),
        }
    }
}

/// Superset of every response schema the prompts ask for; the profile
/// decides which fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    needs_clarification: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    files: Option<Vec<GeneratedFile>>,
    #[serde(default)]
    custom_roles: Option<Vec<CapabilityRequest>>,
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    suggestions: Option<Vec<String>>,
}

/// Recovers a structured result from raw model text. Never fails.
pub fn extract(raw: &str, profile: ExtractionProfile) -> StructuredResult {
    if let Some(payload) = core::locate_payload(raw)
        && let Ok(wire) = serde_json::from_str::<WireResponse>(&payload)
        && let Some(result) = structure(wire, profile)
    {
        return result;
    }

    debug!("direct parse failed, falling back to field-level salvage");
    salvage_result(raw, profile)
}

/// Maps a cleanly parsed response onto the expected result variant.
///
/// Returns `None` when the required field for the profile is missing, which
/// sends the raw text through salvage instead.
fn structure(wire: WireResponse, profile: ExtractionProfile) -> Option<StructuredResult> {
    if wire.needs_clarification {
        return Some(StructuredResult::ClarificationNeeded {
            message: wire.message.unwrap_or_default(),
        });
    }

    match profile {
        ExtractionProfile::Generation => wire.files.map(|files| {
            StructuredResult::Configuration(ConfigurationResult {
                files: sanitize_files(files),
                required_capabilities: wire.custom_roles.unwrap_or_default(),
            })
        }),
        ExtractionProfile::Suggestion(_) => wire.suggestions.map(|suggestions| {
            StructuredResult::Suggestions(SuggestionResult {
                suggestions,
                files: sanitize_files(wire.files.unwrap_or_default()),
            })
        }),
        ExtractionProfile::Analysis => wire.analysis.map(|analysis| {
            StructuredResult::Analysis(AnalysisResult {
                analysis,
                suggestions: wire.suggestions.unwrap_or_default(),
                files: sanitize_files(wire.files.unwrap_or_default()),
            })
        }),
    }
}

/// Drops files the model named unusably: blank names cannot become archive
/// entry paths, and a repeated name would silently shadow an earlier file.
/// First occurrence wins.
fn sanitize_files(files: Vec<GeneratedFile>) -> Vec<GeneratedFile> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|file| {
            if file.name.trim().is_empty() {
                warn!("dropping generated file with empty name");
                return false;
            }
            if !seen.insert(file.name.clone()) {
                warn!(file = %file.name, "dropping generated file with duplicate name");
                return false;
            }
            true
        })
        .collect()
}

/// Tier-3/4 recovery: pull whatever fields survive out of the broken text
/// and substitute fixed fallbacks for the rest.
fn salvage_result(raw: &str, profile: ExtractionProfile) -> StructuredResult {
    let files = salvage::salvage_files(raw).unwrap_or_else(|| {
        warn!("no files recoverable from response, substituting placeholders");
        salvage::placeholder_files()
    });

    match profile {
        ExtractionProfile::Generation => StructuredResult::Configuration(ConfigurationResult {
            files,
            // Capability requests are never salvaged: a half-recovered
            // description would drive a garbage synthesis cycle.
            required_capabilities: Vec::new(),
        }),
        ExtractionProfile::Suggestion(team) => StructuredResult::Suggestions(SuggestionResult {
            suggestions: suggestions_or_default(raw, Some(team)),
            files,
        }),
        ExtractionProfile::Analysis => StructuredResult::Analysis(AnalysisResult {
            analysis: salvage::salvage_analysis(raw)
                .unwrap_or_else(|| salvage::FALLBACK_ANALYSIS.to_string()),
            suggestions: suggestions_or_default(raw, None),
            files,
        }),
    }
}

fn suggestions_or_default(raw: &str, team: Option<Team>) -> Vec<String> {
    let recovered = salvage::salvage_suggestions(raw);
    if recovered.is_empty() {
        warn!("no suggestions recoverable from response, substituting defaults");
        salvage::default_suggestions(team)
    } else {
        recovered
    }
}

/// Extracts a role bundle from a synthesis-cycle reply.
///
/// Unlike [`extract`], this is allowed to give up: a bundle that will not
/// parse is a skipped capability, and salvaging name/content pairs here
/// would namespace garbage into the result set.
pub fn extract_role_bundle(raw: &str) -> Option<RoleBundle> {
    let payload = core::locate_payload(raw)?;
    let bundle: RoleBundle = serde_json::from_str(&payload).ok()?;
    if bundle.files.is_empty() {
        return None;
    }
    Some(bundle)
}
