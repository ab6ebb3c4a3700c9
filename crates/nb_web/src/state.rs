use std::sync::Arc;
use nb_inference::models::{GeminiRelay, UpstreamConfig};
use nb_core::Result;

pub struct AppState {
    /// `None` when the server was started without a provider key.
    pub upstream: Option<Arc<GeminiRelay>>,
}

impl AppState {
    pub fn new(config: Option<UpstreamConfig>) -> Result<Self> {
        let upstream = match config {
            Some(config) => Some(Arc::new(GeminiRelay::new(config, None)?)),
            None => None,
        };
        Ok(Self { upstream })
    }
}
