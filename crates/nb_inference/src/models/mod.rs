use std::sync::Arc;
use nb_core::{Error, Relay, Result};
use serde::{Deserialize, Serialize};

pub mod gemini;
pub mod http;
pub mod fixed;

pub use fixed::StaticRelay;
pub use gemini::{GeminiRelay, UpstreamConfig};
pub use http::HttpRelay;

/// Where search prompts are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// A relay endpoint that holds the provider key.
    pub relay_url: Option<String>,
    /// Talk to the provider directly instead, with a local key.
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub fn create_relay(config: &RelayConfig) -> Result<Arc<dyn Relay>> {
    if let Some(url) = &config.relay_url {
        let relay = HttpRelay::new(url, config.timeout_secs)?;
        return Ok(Arc::new(relay));
    }
    if let Some(key) = &config.api_key {
        let mut upstream = UpstreamConfig::new(key.clone());
        if let Some(model) = &config.model_name {
            upstream.model = model.clone();
        }
        return Ok(Arc::new(GeminiRelay::new(upstream, config.timeout_secs)?));
    }
    Err(Error::Config(
        "no relay configured: set a relay URL or a provider API key".to_string(),
    ))
}
