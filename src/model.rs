//! Request-scoped data model for range generation.
//!
//! Every type here is created for a single request and discarded once the
//! result has been returned. Nothing is shared between concurrent requests.

use serde::{Deserialize, Serialize};

/// A single generated artifact, addressed by an archive-style path.
///
/// File names may carry a capability namespace prefix (`"my-role/tasks/main.yml"`)
/// so they nest correctly when the caller packs them into an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A capability the model identified as missing from the ready-made role set.
///
/// Each request drives one follow-up synthesis cycle; the normalized name
/// becomes the namespace prefix for the files that cycle produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequest {
    pub name: String,
    pub description: String,
}

impl CapabilityRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Lowercases the name and collapses whitespace runs into single hyphens.
    ///
    /// `"Log Forwarder"` becomes `"log-forwarder"`.
    pub fn normalized_name(&self) -> String {
        self.name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Which side of the exercise a suggestion pass is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Red,
    Blue,
}

/// Operating mode for a single generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full range generation with clarification support.
    Standard,
    /// Offensive improvement suggestions for an existing range.
    RedTeam,
    /// Defensive improvement suggestions for an existing range.
    BlueTeam,
    /// Realize previously suggested features instead of proposing new ones.
    FeatureImplementation(Team),
}

impl Mode {
    /// The team context this mode operates under, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            Mode::Standard => None,
            Mode::RedTeam => Some(Team::Red),
            Mode::BlueTeam => Some(Team::Blue),
            Mode::FeatureImplementation(team) => Some(team),
        }
    }
}

/// Immutable input for one generation request.
///
/// Constructed once at the orchestration boundary and threaded through
/// composition, completion and extraction without mutation.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub original_prompt: String,
    pub mode: Mode,
    pub attached_file_content: Option<String>,
}

impl PromptContext {
    pub fn new(original_prompt: impl Into<String>, mode: Mode) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            mode,
            attached_file_content: None,
        }
    }

    /// Attaches extracted file content the model should treat as existing
    /// state to modify.
    pub fn with_attached_content(mut self, content: impl Into<String>) -> Self {
        self.attached_file_content = Some(content.into());
        self
    }
}

/// A full range configuration produced in standard mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationResult {
    pub files: Vec<GeneratedFile>,
    pub required_capabilities: Vec<CapabilityRequest>,
}

/// Analysis of uploaded configuration state plus improvement suggestions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub analysis: String,
    pub suggestions: Vec<String>,
    pub files: Vec<GeneratedFile>,
}

/// Red/blue team suggestions, optionally with implementing files.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionResult {
    pub suggestions: Vec<String>,
    pub files: Vec<GeneratedFile>,
}

/// The single, always-well-formed outcome of a generation request.
///
/// Callers must check for `ClarificationNeeded` before consulting any other
/// variant's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    /// The model needs more information; relay `message` to the user verbatim.
    ClarificationNeeded { message: String },
    Configuration(ConfigurationResult),
    Analysis(AnalysisResult),
    Suggestions(SuggestionResult),
}

impl StructuredResult {
    pub fn needs_clarification(&self) -> bool {
        matches!(self, StructuredResult::ClarificationNeeded { .. })
    }

    /// The generated files carried by this result, empty for clarifications.
    pub fn files(&self) -> &[GeneratedFile] {
        match self {
            StructuredResult::ClarificationNeeded { .. } => &[],
            StructuredResult::Configuration(r) => &r.files,
            StructuredResult::Analysis(r) => &r.files,
            StructuredResult::Suggestions(r) => &r.files,
        }
    }
}

/// Wire shape of a synthesized role bundle: an ordered map of role-relative
/// file paths to contents, plus a short description of the role.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleBundle {
    pub files: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub description: String,
}
