//! Reading the model's text out of the relay response body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a relay body turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Model text that still has to go through the payload parser.
    Text(String),
    /// The body already is the payload object.
    Payload(Value),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStrategy {
    /// `candidates[0].content.parts[*].text`
    Gemini,
    /// top-level `text`
    PlainText,
    /// `choices[0].message.content`
    ChatCompletion,
    /// a body carrying `summaries` directly
    Direct,
    /// every shape above, in that order
    #[default]
    Auto,
}

impl EnvelopeStrategy {
    const AUTO_ORDER: [EnvelopeStrategy; 4] = [
        EnvelopeStrategy::Gemini,
        EnvelopeStrategy::PlainText,
        EnvelopeStrategy::ChatCompletion,
        EnvelopeStrategy::Direct,
    ];

    pub fn open(&self, body: &Value) -> Option<Envelope> {
        match self {
            EnvelopeStrategy::Gemini => gemini_text(body).map(Envelope::Text),
            EnvelopeStrategy::PlainText => body
                .get("text")
                .and_then(Value::as_str)
                .map(|s| Envelope::Text(s.to_string())),
            EnvelopeStrategy::ChatCompletion => body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(|s| Envelope::Text(s.to_string())),
            EnvelopeStrategy::Direct => body
                .get("summaries")
                .is_some()
                .then(|| Envelope::Payload(body.clone())),
            EnvelopeStrategy::Auto => Self::AUTO_ORDER.iter().find_map(|s| s.open(body)),
        }
    }
}

fn gemini_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(text)
}
