//! Payload location and low-level string scanning.
//!
//! These are the primitives the extraction tiers are built on: finding the
//! JSON payload inside model prose, scanning quoted values without tripping
//! on escaped quotes, and undoing the escapes the model applied.

use regex::Regex;

/// Locates the most plausible JSON payload in raw model text.
///
/// Tried in order: a ```json fenced block, any fenced block, then the first
/// balanced top-level `{...}` span. Returns the inner text, trimmed.
pub(crate) fn locate_payload(text: &str) -> Option<String> {
    if let Some(inner) = fenced_block(text, Some("json")) {
        return Some(inner);
    }
    if let Some(inner) = fenced_block(text, None) {
        return Some(inner);
    }
    first_json_object(text).map(|span| span.to_string())
}

fn fenced_block(text: &str, language: Option<&str>) -> Option<String> {
    let pattern = match language {
        Some(lang) => format!(r"(?s)```{}\s*\n(.*?)\n\s*```", regex::escape(lang)),
        None => r"(?s)```[^\n]*\n(.*?)\n\s*```".to_string(),
    };

    if let Ok(regex) = Regex::new(&pattern)
        && let Some(captures) = regex.captures(text)
        && let Some(inner) = captures.get(1)
    {
        return Some(inner.as_str().trim().to_string());
    }
    None
}

/// Finds the first balanced top-level JSON object in the text.
///
/// The scan is string-aware: braces inside quoted values do not count, and a
/// backslash escapes the character after it.
pub(crate) fn first_json_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0
                        && let Some(s) = start
                    {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

/// Scans a quoted string value starting at the opening quote's byte index.
///
/// Returns the raw span between the quotes, still escaped. A backslash
/// consumes the following character, so an escaped quote (`\"`) never
/// terminates the scan. Returns `None` when `open_quote` does not sit on a
/// quote or the closing quote is missing (truncated output).
pub(crate) fn scan_string_value(text: &str, open_quote: usize) -> Option<&str> {
    let body = text.get(open_quote..)?;
    let mut chars = body.char_indices();
    if !matches!(chars.next(), Some((_, '"'))) {
        return None;
    }

    let mut escape_next = false;
    for (i, ch) in chars {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' => escape_next = true,
            '"' => return Some(&body[1..i]),
            _ => {}
        }
    }

    None
}

/// Undoes JSON string escapes in a single left-to-right pass.
///
/// Each escape is consumed exactly once, with `\"` -> `"`, `\n` -> newline
/// and `\\` -> `\`; a literal `\\n` in the source therefore decodes to a
/// backslash followed by `n`, never a real newline. Unknown escapes are kept
/// verbatim rather than dropped.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_payload_prefers_json_fence() {
        let text = "Intro\n```\nnot the one\n```\nand\n```json\n{\"a\": 1}\n```\ndone";
        assert_eq!(locate_payload(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_locate_payload_falls_back_to_any_fence() {
        let text = "Here you go:\n```\n{\"a\": 1}\n```";
        assert_eq!(locate_payload(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_locate_payload_falls_back_to_brace_scan() {
        let text = "The config is {\"a\": 1} as requested.";
        assert_eq!(locate_payload(text).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_locate_payload_none_without_json() {
        assert_eq!(locate_payload("no structured content here"), None);
    }

    #[test]
    fn test_first_json_object_ignores_braces_in_strings() {
        let text = r#"x {"key": "value with } brace"} y"#;
        assert_eq!(
            first_json_object(text).unwrap(),
            r#"{"key": "value with } brace"}"#
        );
    }

    #[test]
    fn test_first_json_object_handles_nesting() {
        let text = r#"{"outer": {"inner": 1}} {"second": 2}"#;
        assert_eq!(first_json_object(text).unwrap(), r#"{"outer": {"inner": 1}}"#);
    }

    #[test]
    fn test_first_json_object_none_when_unbalanced() {
        assert_eq!(first_json_object(r#"{"truncated": "value"#), None);
    }

    #[test]
    fn test_scan_string_value_stops_at_closing_quote() {
        let text = r#""hello" trailing"#;
        assert_eq!(scan_string_value(text, 0).unwrap(), "hello");
    }

    #[test]
    fn test_scan_string_value_skips_escaped_quotes() {
        // The escaped quotes inside the value must not terminate the scan.
        let text = r#""a \"quoted\" word" tail"#;
        assert_eq!(scan_string_value(text, 0).unwrap(), r#"a \"quoted\" word"#);
    }

    #[test]
    fn test_scan_string_value_none_when_unterminated() {
        assert_eq!(scan_string_value(r#""never closed"#, 0), None);
    }

    #[test]
    fn test_scan_string_value_none_off_quote() {
        assert_eq!(scan_string_value("abc", 0), None);
        assert_eq!(scan_string_value("abc", 100), None);
    }

    #[test]
    fn test_unescape_basic_sequences() {
        assert_eq!(unescape(r#"line1\nline2"#), "line1\nline2");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r#"C:\\temp"#), "C:\\temp");
    }

    #[test]
    fn test_unescape_literal_backslash_n_survives() {
        // \\n is an escaped backslash followed by a plain n; it must decode
        // to backslash + n, not a newline.
        assert_eq!(unescape(r#"line1\\nline2"#), "line1\\nline2");
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape(r#"a\tb"#), "a\\tb");
    }

    #[test]
    fn test_unescape_trailing_backslash() {
        assert_eq!(unescape(r#"ends with \"#), "ends with \\");
    }
}
