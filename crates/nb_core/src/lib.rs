pub mod error;
pub mod relay;
pub mod sanitize;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use relay::{Relay, RelayMessage, RelayPart, RelayRequest};
pub use sanitize::sanitize;
pub use storage::KeyValueStore;
pub use types::{korean_date, KOREAN_DATE_FORMAT, AppData, ArticleLink, HistoryItem, NewsSummary};
