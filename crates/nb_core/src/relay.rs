use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub role: String,
    pub parts: Vec<RelayPart>,
}

impl RelayMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![RelayPart { text: text.into() }],
        }
    }
}

/// Body accepted by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub messages: Vec<RelayMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

impl RelayRequest {
    /// A single user prompt with the search grounding tool enabled.
    pub fn grounded_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![RelayMessage::user(prompt)],
            tools: Some(vec![serde_json::json!({ "googleSearch": {} })]),
        }
    }
}

/// The remote model, reached through the relay that holds the API key.
#[async_trait]
pub trait Relay: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Sends one request and returns the raw response body.
    async fn generate(&self, request: &RelayRequest) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_prompt_wire_shape() {
        let request = RelayRequest::grounded_prompt("hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["parts"][0]["text"], "hello");
        assert!(json["tools"][0]["googleSearch"].is_object());
    }

    #[test]
    fn test_tools_are_optional() {
        let request: RelayRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","parts":[{"text":"hi"}]}]}"#).unwrap();
        assert!(request.tools.is_none());
        assert_eq!(request.messages[0].parts[0].text, "hi");
    }
}
