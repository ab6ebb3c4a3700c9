use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use nb_core::{Error, Relay, RelayRequest, Result};
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Client for the relay endpoint that forwards prompts to the provider.
pub struct HttpRelay {
    client: Client,
    url: Url,
}

impl fmt::Debug for HttpRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRelay")
            .field("client", &"<reqwest::Client>")
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl HttpRelay {
    pub fn new(url: &str, timeout_secs: Option<u64>) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::Config(format!("invalid relay URL {}: {}", url, e)))?;
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url,
        })
    }
}

/// Pulls a readable message out of a `{ "error": ... }` body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| match v.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => other.get("message").and_then(Value::as_str).map(str::to_string),
            None => None,
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl Relay for HttpRelay {
    fn name(&self) -> &str {
        "HttpRelay"
    }

    async fn generate(&self, request: &RelayRequest) -> Result<Value> {
        tracing::debug!("Posting prompt to relay {}", self.url);
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("relay unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read relay response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Transport(format!("relay returned {}: {}", status, error_message(&body))));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("relay body is not JSON: {}", e)))
    }
}
