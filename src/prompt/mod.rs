//! Prompt composition and mode resolution.
//!
//! [`PromptComposer`] is a pure function from a [`PromptContext`] to the pair
//! of strings sent to the completion service. Mode resolution for uploaded
//! content is keyword sniffing over the free-text prompt; brittle, but
//! load-bearing, so the trigger lists and their priority order live in one
//! ordered table here rather than scattered conditionals.

pub mod templates;

use minijinja::Environment;
use serde::Serialize;

use crate::model::{CapabilityRequest, Mode, PromptContext, Team};

/// Renders a prompt from a template string and a serializable context.
pub fn render_prompt<T: Serialize>(template: &str, context: T) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("prompt", template)?;
    let tmpl = env.get_template("prompt")?;
    tmpl.render(context)
}

/// Trigger keywords checked first; any hit selects red team wording.
const RED_TRIGGERS: &[&str] = &["red team", "redteam", "vulnerab", "make vulnerable"];

/// Checked only after the red triggers miss.
const BLUE_TRIGGERS: &[&str] = &[
    "blue team",
    "blueteam",
    "monitoring",
    "detection",
    "threat hunting",
];

/// Resolves the operating mode for a request.
///
/// An explicit mode always wins. Without one (the upload path, where no mode
/// field exists), the prompt text is scanned case-insensitively against the
/// trigger tables, red before blue; no hit means standard analysis wording.
pub fn resolve_mode(explicit: Option<Mode>, prompt_text: &str) -> Mode {
    if let Some(mode) = explicit {
        return mode;
    }
    let lower = prompt_text.to_lowercase();
    if RED_TRIGGERS.iter().any(|trigger| lower.contains(trigger)) {
        return Mode::RedTeam;
    }
    if BLUE_TRIGGERS.iter().any(|trigger| lower.contains(trigger)) {
        return Mode::BlueTeam;
    }
    Mode::Standard
}

const IMPLEMENT_RED_PHRASE: &str = "implement the following red team features";
const IMPLEMENT_BLUE_PHRASE: &str = "implement the following blue team features";

/// Detects the feature-implementation request pattern in a user message.
pub fn detect_feature_implementation(user_message: &str) -> Option<Team> {
    let lower = user_message.to_lowercase();
    if lower.contains(IMPLEMENT_RED_PHRASE) {
        Some(Team::Red)
    } else if lower.contains(IMPLEMENT_BLUE_PHRASE) {
        Some(Team::Blue)
    } else {
        None
    }
}

/// The two strings a completion call is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_instructions: String,
    pub user_message: String,
}

/// Builds the instruction text for each operating mode.
pub struct PromptComposer;

impl PromptComposer {
    /// Composes the system instructions and user message for a request.
    ///
    /// Pure and infallible; the instruction block is selected by mode, then
    /// overridden when the user message itself asks for named features to be
    /// implemented, and finally extended with the attached-content directive
    /// when uploaded file content rides along.
    pub fn compose(context: &PromptContext) -> ComposedPrompt {
        let mut system = Self::instruction_block(context);

        let user_message = match &context.attached_file_content {
            Some(attached) => {
                system.push_str(templates::ATTACHED_CONTENT_DIRECTIVE);
                format!(
                    "{}\n\n--- BEGIN UPLOADED FILES ---\n{}\n--- END UPLOADED FILES ---",
                    context.original_prompt, attached
                )
            }
            None => context.original_prompt.clone(),
        };

        ComposedPrompt {
            system_instructions: system,
            user_message,
        }
    }

    fn instruction_block(context: &PromptContext) -> String {
        // A feature-implementation phrase in the message overrides whatever
        // mode the caller resolved.
        let team = detect_feature_implementation(&context.original_prompt).or(match context.mode {
            Mode::FeatureImplementation(team) => Some(team),
            _ => None,
        });
        if let Some(team) = team {
            return implementation_block(team);
        }

        match context.mode {
            Mode::Standard => {
                if context.attached_file_content.is_some() {
                    templates::ANALYSIS_SYSTEM.to_string()
                } else {
                    templates::GENERATION_SYSTEM.to_string()
                }
            }
            Mode::RedTeam => templates::RED_TEAM_SYSTEM.to_string(),
            Mode::BlueTeam => templates::BLUE_TEAM_SYSTEM.to_string(),
            // Unreachable in practice, handled above.
            Mode::FeatureImplementation(team) => implementation_block(team),
        }
    }

    /// Composes the follow-up prompt for one capability synthesis cycle.
    ///
    /// Embeds the capability name, its description and the original
    /// environment description; a render failure here is a skipped
    /// capability, not a request failure.
    pub fn compose_role_prompt(
        base_prompt: &str,
        request: &CapabilityRequest,
    ) -> Result<ComposedPrompt, minijinja::Error> {
        let user_message = render_prompt(
            templates::ROLE_USER,
            minijinja::context! {
                prompt => base_prompt,
                role_name => request.normalized_name(),
                description => &request.description,
            },
        )?;

        Ok(ComposedPrompt {
            system_instructions: templates::ROLE_SYSTEM.to_string(),
            user_message,
        })
    }
}

fn implementation_block(team: Team) -> String {
    let label = match team {
        Team::Red => "red",
        Team::Blue => "blue",
    };
    templates::IMPLEMENTATION_SYSTEM.replace("{{ team }}", label)
}
