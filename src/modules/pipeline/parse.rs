/// Helpers for digging structured JSON out of LLM prose.
///
/// Responses may arrive wrapped in markdown code fences or surrounded by
/// commentary; callers strip that here and validate the payload with typed
/// serde deserialization afterwards.
use regex::Regex;
use std::sync::OnceLock;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[a-zA-Z]*\s*\n?").unwrap())
}

/// Remove surrounding markdown code fences, if present.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let without_open = fence_re().replace(trimmed, "");
    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open.trim_end());

    without_close.trim().to_string()
}

/// Slice out the outermost JSON array from a response, tolerating text
/// before and after it. Returns None when no array is present.
pub fn extract_json_array(text: &str) -> Option<String> {
    let cleaned = strip_code_fences(text);

    if cleaned.starts_with('[') {
        return Some(cleaned);
    }

    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if end <= start {
        return None;
    }

    Some(cleaned[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array_passes_through() {
        assert_eq!(extract_json_array(r#"[1, 2]"#).unwrap(), "[1, 2]");
    }

    #[test]
    fn test_strips_json_fence() {
        let input = "```json\n[{\"name\": \"A\"}]\n```";
        assert_eq!(extract_json_array(input).unwrap(), "[{\"name\": \"A\"}]");
    }

    #[test]
    fn test_strips_bare_fence() {
        let input = "```\n[]\n```";
        assert_eq!(extract_json_array(input).unwrap(), "[]");
    }

    #[test]
    fn test_slices_array_out_of_prose() {
        let input = "Here is your plan:\n[\"a\", \"b\"]\nEnjoy!";
        assert_eq!(extract_json_array(input).unwrap(), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_no_array_returns_none() {
        assert!(extract_json_array("no structure here").is_none());
        assert!(extract_json_array("] backwards [").is_none());
    }
}
