//! Field-level salvage for malformed model output.
//!
//! When the payload will not parse as JSON (truncated, unescaped control
//! characters, literal newlines inside string values), these routines pull
//! individual fields straight out of the broken text. Every routine has a
//! fixed fallback so extraction always terminates in a well-formed result.

use regex::Regex;
use tracing::debug;

use super::core::{scan_string_value, unescape};
use crate::model::{GeneratedFile, Team};

/// Substituted when no analysis text is recoverable.
pub(crate) const FALLBACK_ANALYSIS: &str = "The analysis could not be parsed from the model \
     response. Review the suggestions and files below; they may still be usable.";

/// Recovers the quoted value following the `"analysis"` key.
pub(crate) fn salvage_analysis(text: &str) -> Option<String> {
    let regex = Regex::new(r#""analysis"\s*:\s*"([^"]*)""#).ok()?;
    regex
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Recovers suggestion strings by splitting the `"suggestions"` array span
/// on quote-comma boundaries.
///
/// Empty elements produced by the split are dropped; a truncated array (no
/// closing bracket) is salvaged to the end of the text.
pub(crate) fn salvage_suggestions(text: &str) -> Vec<String> {
    let Some(key_pos) = text.find("\"suggestions\"") else {
        return Vec::new();
    };
    let after_key = &text[key_pos..];
    let Some(open) = after_key.find('[') else {
        return Vec::new();
    };
    let body = &after_key[open + 1..];
    let span = match body.find(']') {
        Some(close) => &body[..close],
        None => body,
    };

    span.split("\",")
        .map(|piece| piece.trim().trim_matches('"').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

const RED_DEFAULTS: &[&str] = &[
    "Add an intentionally vulnerable web application host (e.g. DVWA on a Debian VM) as an initial access target.",
    "Introduce a misconfigured Active Directory certificate template to create an ESC1-style escalation path.",
    "Give one service account a kerberoastable SPN with a dictionary password.",
    "Enable unsigned SMB on a file server to open lateral movement options.",
    "Seed plaintext credentials in world-readable scripts or shares for discovery exercises.",
    "Add a jump host running an outdated, exploitable service version for privilege escalation practice.",
    "Configure an overly permissive GPO granting local admin rights to a broad user group.",
];

const BLUE_DEFAULTS: &[&str] = &[
    "Deploy Sysmon with a tuned configuration on every Windows host.",
    "Forward endpoint and network logs to a central SIEM host such as Elastic or Wazuh.",
    "Enable PowerShell script block logging and transcription via GPO.",
    "Add a network sensor VM running Zeek or Suricata on a mirrored segment.",
    "Enable Windows audit policies for logon, account management and object access events.",
    "Deploy a Wazuh or EDR agent across the fleet with alerting into the SIEM.",
    "Plant honeypot credentials or canary tokens to detect lateral movement early.",
];

const GENERAL_DEFAULTS: &[&str] = &[
    "Pin OS templates and Ansible role versions so deployments stay reproducible.",
    "Split services onto separate VMs to keep failure domains small.",
    "Review RAM and CPU allocations against the capacity of the Ludus host.",
    "Document credentials and access paths in the range README.",
    "Use role_vars instead of editing roles so customizations stay portable.",
    "Add a dedicated management network for deployment and administration traffic.",
    "Snapshot VMs after a clean deployment to allow fast resets between exercises.",
];

/// Fixed default suggestion set for the active team context.
pub(crate) fn default_suggestions(team: Option<Team>) -> Vec<String> {
    let defaults = match team {
        Some(Team::Red) => RED_DEFAULTS,
        Some(Team::Blue) => BLUE_DEFAULTS,
        None => GENERAL_DEFAULTS,
    };
    defaults.iter().map(|s| s.to_string()).collect()
}

/// Recovers name/content file pairs from broken text.
///
/// Requires a `"files"` key to anchor the scan. Each `"name"` key is paired
/// with the next `"content"` key after it; the content value is recovered by
/// the escape-aware string scan, so embedded escaped quotes do not truncate
/// it. Returns `None` when no pairs are recoverable.
pub(crate) fn salvage_files(text: &str) -> Option<Vec<GeneratedFile>> {
    let files_pos = text.find("\"files\"")?;
    let region = &text[files_pos..];

    let name_re = Regex::new(r#""name"\s*:\s*"([^"]*)""#).ok()?;
    let content_re = Regex::new(r#""content"\s*:\s*""#).ok()?;

    let mut files = Vec::new();
    for captures in name_re.captures_iter(region) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let name = name.as_str().trim();
        if name.is_empty() {
            continue;
        }

        let tail = &region[whole.end()..];
        let Some(content_key) = content_re.find(tail) else {
            continue;
        };
        // The match ends one byte past the opening quote of the value.
        let open_quote = content_key.end() - 1;
        let Some(raw) = scan_string_value(tail, open_quote) else {
            debug!(file = name, "content value unterminated, skipping");
            continue;
        };

        files.push(GeneratedFile::new(name, unescape(raw)));
    }

    if files.is_empty() { None } else { Some(files) }
}

/// The two-file placeholder set used when no files are recoverable at all.
pub(crate) fn placeholder_files() -> Vec<GeneratedFile> {
    vec![
        GeneratedFile::new(
            "ludus-range-config.yml",
            "# Generation failed\n\
             # The model response could not be parsed into a range configuration.\n\
             # Please retry your request; adding detail about hosts, templates and\n\
             # roles usually helps.\n",
        ),
        GeneratedFile::new(
            "README.md",
            "# Generation Failed\n\n\
             The model response could not be parsed into configuration files.\n\
             Please retry your request, rephrasing or adding more specific\n\
             requirements.\n",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salvage_analysis_captures_quoted_value() {
        let text = r#"garbage "analysis": "The range lacks monitoring", more garbage"#;
        assert_eq!(
            salvage_analysis(text).unwrap(),
            "The range lacks monitoring"
        );
    }

    #[test]
    fn test_salvage_analysis_none_when_absent() {
        assert_eq!(salvage_analysis("nothing useful"), None);
    }

    #[test]
    fn test_salvage_suggestions_splits_and_trims() {
        let text = "{\"suggestions\": [\"add sysmon\",\n  \"forward logs\",\n  \"deploy zeek\"], \"other\": 1";
        assert_eq!(
            salvage_suggestions(text),
            vec!["add sysmon", "forward logs", "deploy zeek"]
        );
    }

    #[test]
    fn test_salvage_suggestions_drops_empty_entries() {
        let text = r#""suggestions": ["one", "", "two"]"#;
        assert_eq!(salvage_suggestions(text), vec!["one", "two"]);
    }

    #[test]
    fn test_salvage_suggestions_handles_truncated_array() {
        let text = r#""suggestions": ["first", "second", "cut of"#;
        assert_eq!(salvage_suggestions(text), vec!["first", "second", "cut of"]);
    }

    #[test]
    fn test_salvage_suggestions_empty_when_key_missing() {
        assert!(salvage_suggestions("no array here").is_empty());
    }

    #[test]
    fn test_default_suggestions_have_at_least_seven_each() {
        assert!(default_suggestions(Some(Team::Red)).len() >= 7);
        assert!(default_suggestions(Some(Team::Blue)).len() >= 7);
        assert!(default_suggestions(None).len() >= 7);
    }

    #[test]
    fn test_default_suggestions_distinct_per_team() {
        assert_ne!(
            default_suggestions(Some(Team::Red)),
            default_suggestions(Some(Team::Blue))
        );
    }

    #[test]
    fn test_salvage_files_recovers_pairs() {
        let text = r##"{"files": [
            {"name": "config.yml", "content": "ludus:\n  - vm_name: dc01"},
            {"name": "README.md", "content": "# Lab"##;
        let files = salvage_files(text).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "config.yml");
        assert_eq!(files[0].content, "ludus:\n  - vm_name: dc01");
    }

    #[test]
    fn test_salvage_files_escaped_quote_does_not_truncate() {
        let text = r#""files": [{"name": "a.txt", "content": "a \"quoted\" word"}]"#;
        let files = salvage_files(text).unwrap();
        assert_eq!(files[0].content, r#"a "quoted" word"#);
    }

    #[test]
    fn test_salvage_files_none_without_files_key() {
        assert_eq!(salvage_files(r#"{"name": "x", "content": "y"}"#), None);
    }

    #[test]
    fn test_salvage_files_none_without_pairs() {
        assert_eq!(salvage_files(r#""files": [ total garbage ]"#), None);
    }

    #[test]
    fn test_placeholder_files_shape() {
        let files = placeholder_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "ludus-range-config.yml");
        assert_eq!(files[1].name, "README.md");
        for file in &files {
            assert!(file.content.to_lowercase().contains("retry"));
        }
    }
}
