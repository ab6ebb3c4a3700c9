use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use nb_core::{Error, Relay, RelayMessage, RelayRequest, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use super::http::error_message;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl UpstreamConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [RelayMessage],
    tools: Vec<Value>,
    generation_config: GenerationConfig,
}

/// The provider's `generateContent` endpoint, called with a local key.
pub struct GeminiRelay {
    client: Client,
    config: UpstreamConfig,
}

impl fmt::Debug for GeminiRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiRelay")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiRelay {
    pub fn new(config: UpstreamConfig, timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Sends the request upstream and hands back the status and body untouched.
    pub async fn forward(&self, request: &RelayRequest) -> Result<(u16, Value)> {
        let body = GenerateContentRequest {
            contents: &request.messages,
            tools: request
                .tools
                .clone()
                .unwrap_or_else(|| vec![json!({ "googleSearch": {} })]),
            generation_config: GenerationConfig::default(),
        };

        tracing::debug!("Calling {} with model {}", self.config.base_url, self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("provider unreachable: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read provider response: {}", e)))?;
        let value = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": error_message(&text) }));
        Ok((status, value))
    }
}

#[async_trait]
impl Relay for GeminiRelay {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, request: &RelayRequest) -> Result<Value> {
        let (status, body) = self.forward(request).await?;
        if !(200..300).contains(&status) {
            return Err(Error::Transport(format!(
                "provider returned {}: {}",
                status,
                error_message(&body.to_string())
            )));
        }
        Ok(body)
    }
}
