use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::error::GenerationError;

const FENCE: &str = "```";

/// First `{` through the last `}` that ends its line.
fn line_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?ms)\{.*\}[ \t]*$").expect("valid JSON block regex"))
}

/// First `{` through the last `}` anywhere.
fn widest_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON block regex"))
}

/// Strip one leading and one trailing markdown fence.
///
/// The leading fence may carry a language tag (```` ```json ````). Surrounding
/// whitespace is trimmed before and after stripping.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest.trim_end();
    }

    text
}

/// Extract the JSON payload from free-text model output.
///
/// Tries a direct parse of the fence-stripped text first, then the block from
/// the first `{` to the last `}` that closes a line, so braces in trailing
/// prose are ignored. The widest `{ ... }` block is the last resort, for
/// objects followed by prose on the same line. Assumes one intended JSON
/// object; several candidate objects are not disambiguated.
pub fn normalize(raw: &str) -> Result<Value, GenerationError> {
    let stripped = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        return Ok(value);
    }

    for regex in [line_block_regex(), widest_block_regex()] {
        if let Some(block) = regex.find(stripped) {
            match serde_json::from_str::<Value>(block.as_str()) {
                Ok(value) => return Ok(value),
                Err(e) => log::debug!("Extracted JSON block failed to parse: {e}"),
            }
        }
    }

    Err(GenerationError::Normalization {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "files": [
                { "path": "server.py", "content": "print('hi')" },
                { "path": "README.md", "content": "# Hi\n" }
            ]
        })
    }

    #[test]
    fn test_plain_json_passes_through() {
        let raw = serde_json::to_string(&payload()).unwrap();
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_pretty_printed_json() {
        let raw = serde_json::to_string_pretty(&payload()).unwrap();
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_json_fence() {
        let raw = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&payload()).unwrap()
        );
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_plain_fence_with_whitespace() {
        let raw = format!(
            "\n\n```\n{}\n```\n  ",
            serde_json::to_string(&payload()).unwrap()
        );
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_single_leading_fence() {
        let raw = format!("```json\n{}", serde_json::to_string(&payload()).unwrap());
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_leading_and_trailing_commentary() {
        let raw = format!(
            "Here is your server:\n{}\nLet me know if you need changes.",
            serde_json::to_string_pretty(&payload()).unwrap()
        );
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_braces_in_trailing_commentary() {
        let raw = format!(
            "Here you go:\n{}\nRemember to set {{API_KEY}} in your .env file.",
            serde_json::to_string(&payload()).unwrap()
        );
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_commentary_on_the_closing_line() {
        let raw = format!(
            "Result: {} (four files)",
            serde_json::to_string(&payload()).unwrap()
        );
        assert_eq!(normalize(&raw).unwrap(), payload());
    }

    #[test]
    fn test_object_without_files_field() {
        let value = normalize(r#"{"answer": "42"}"#).unwrap();
        assert!(value.get("files").is_none());
        assert_eq!(value, json!({ "answer": "42" }));
    }

    #[test]
    fn test_no_braces_is_error() {
        let raw = "I'm sorry, I can't help with that.";
        assert_eq!(
            normalize(raw),
            Err(GenerationError::Normalization {
                raw: raw.to_string()
            })
        );
    }

    #[test]
    fn test_unbalanced_block_is_error() {
        let err = normalize("Sure! { \"files\": [ }").unwrap_err();
        assert!(matches!(err, GenerationError::Normalization { .. }));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(normalize("   ").is_err());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```{}```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("{}\n```"), "{}");
    }
}
