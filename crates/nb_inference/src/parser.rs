//! Extraction of a JSON payload from free-form model output.
//!
//! Models wrap their JSON in many ways: a ```` ```json ```` fence, an untagged
//! fence, nothing at all, or prose around a bare object. Each way is handled by
//! one [`Strategy`]; strategies are tried in order and the first object found wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?is)```json[ \t]*\r?\n?(.*?)```").unwrap();
    static ref ANY_FENCE: Regex = Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// First fence tagged as `json`.
    JsonFence,
    /// First fence of any kind.
    AnyFence,
    /// The whole text.
    Raw,
    /// Everything between the first `{` and the last `}`.
    OuterBraces,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::JsonFence,
        Strategy::AnyFence,
        Strategy::Raw,
        Strategy::OuterBraces,
    ];

    pub fn candidate<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            Strategy::JsonFence => first_capture(&JSON_FENCE, text),
            Strategy::AnyFence => first_capture(&ANY_FENCE, text),
            Strategy::Raw => Some(text),
            Strategy::OuterBraces => {
                let start = text.find('{')?;
                let end = text.rfind('}')?;
                (start < end).then(|| &text[start..=end])
            }
        }
    }

    pub fn extract(&self, text: &str) -> Option<Value> {
        let candidate = self.candidate(text)?.trim();
        if candidate.is_empty() {
            return None;
        }
        serde_json::from_str::<Value>(candidate)
            .ok()
            .filter(Value::is_object)
    }
}

fn first_capture<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns the first JSON object any strategy can read from `text`.
pub fn extract_payload(text: &str) -> Option<Value> {
    extract_with(text).map(|(_, value)| value)
}

/// Like [`extract_payload`], also reporting which strategy succeeded.
pub fn extract_with(text: &str) -> Option<(Strategy, Value)> {
    Strategy::ORDER.iter().find_map(|strategy| {
        let value = strategy.extract(text)?;
        tracing::debug!("Payload extracted with {:?}", strategy);
        Some((*strategy, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_fence() {
        let text = "Here you go:\n```json\n{\"summaries\": [1, 2]}\n```\nAnything else?";
        let (strategy, value) = extract_with(text).unwrap();
        assert_eq!(strategy, Strategy::JsonFence);
        assert_eq!(value, json!({"summaries": [1, 2]}));
    }

    #[test]
    fn test_uppercase_json_tag() {
        let text = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_payload(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_generic_fence() {
        let text = "```\n{\"a\": true}\n```";
        let (strategy, value) = extract_with(text).unwrap();
        assert_eq!(strategy, Strategy::AnyFence);
        assert_eq!(value, json!({"a": true}));
    }

    #[test]
    fn test_plain_json() {
        let text = "  {\"summaries\": [], \"recommendations\": [\"x\"]}\n";
        let (strategy, value) = extract_with(text).unwrap();
        assert_eq!(strategy, Strategy::Raw);
        assert_eq!(value["recommendations"][0], "x");
    }

    #[test]
    fn test_braces_inside_prose() {
        let text = "Sure! The result is {\"a\": {\"b\": 2}} and that's it.";
        let (strategy, value) = extract_with(text).unwrap();
        assert_eq!(strategy, Strategy::OuterBraces);
        assert_eq!(value, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_prose_returns_none() {
        assert_eq!(extract_payload("죄송합니다. 관련 뉴스를 찾지 못했습니다."), None);
        assert_eq!(extract_payload(""), None);
        assert_eq!(extract_payload("} backwards {"), None);
    }

    #[test]
    fn test_only_first_json_fence_is_used() {
        let text = "```json\n{\"first\": 1}\n```\n```json\n{\"second\": 2}\n```";
        assert_eq!(extract_payload(text), Some(json!({"first": 1})));
    }

    #[test]
    fn test_whitespace_fence_is_a_failure() {
        assert_eq!(Strategy::JsonFence.extract("```json\n   \n```"), None);
        assert_eq!(Strategy::AnyFence.extract("```\n\n```"), None);
    }

    #[test]
    fn test_broken_fence_falls_through_to_braces() {
        let text = "```json\n{\"a\": 1,,}\n```\nfixed: {\"a\": 1}";
        // the fenced body is invalid, the outer braces span both objects and are invalid too
        assert_eq!(extract_payload(text), None);

        let text = "```json\nnot json\n```\n{\"a\": 1}";
        assert_eq!(extract_payload(text), Some(json!({"a": 1})));
    }

    #[test]
    fn test_arrays_are_not_payloads() {
        assert_eq!(extract_payload("[1, 2, 3]"), None);
    }
}
