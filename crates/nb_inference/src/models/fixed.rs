use std::fmt;
use async_trait::async_trait;
use nb_core::{Error, Relay, RelayRequest, Result};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// Answers every request with the same canned body, or the same failure.
/// Keeps the requests it saw.
pub struct StaticRelay {
    reply: std::result::Result<Value, (u16, String)>,
    seen: Mutex<Vec<RelayRequest>>,
}

impl fmt::Debug for StaticRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRelay").field("reply", &self.reply).finish()
    }
}

impl StaticRelay {
    pub fn new(body: Value) -> Self {
        Self {
            reply: Ok(body),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Wraps model text in a provider-style `candidates` envelope.
    pub fn with_text(text: &str) -> Self {
        Self::new(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        }))
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<RelayRequest> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl Relay for StaticRelay {
    fn name(&self) -> &str {
        "Static"
    }

    async fn generate(&self, request: &RelayRequest) -> Result<Value> {
        self.seen.lock().await.push(request.clone());
        match &self.reply {
            Ok(body) => Ok(body.clone()),
            Err((status, message)) => Err(Error::Transport(format!("relay returned {}: {}", status, message))),
        }
    }
}
