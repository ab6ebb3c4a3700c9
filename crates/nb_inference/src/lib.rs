pub mod aggregator;
pub mod curator;
pub mod envelope;
pub mod image;
pub mod models;
pub mod parser;
pub mod prompt;

pub use aggregator::{AggregatorConfig, SummaryAggregator};
pub use curator::{CandidateLink, LinkCurator};
pub use envelope::{Envelope, EnvelopeStrategy};
pub use image::{ImageConfig, ImageResolver};
pub use models::{create_relay, RelayConfig};
pub use parser::extract_payload;
pub use prompt::PromptTemplate;

pub mod prelude {
    pub use super::{create_relay, AggregatorConfig, RelayConfig, SummaryAggregator};
    pub use nb_core::{AppData, Error, NewsSummary, Result};
}
