use std::path::PathBuf;
use std::sync::Arc;
use nb_core::{Error, KeyValueStore, Result};

pub mod backends;
pub mod history;

pub use backends::{FileStore, MemoryStore};
pub use history::{DateGroup, HistoryStore, HISTORY_KEY, MAX_HISTORY};

/// Builds a store by name: `memory` or `file` (rooted at `dir`, or the default data directory).
pub fn create_store(kind: &str, dir: Option<PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => Ok(Arc::new(FileStore::new(dir.unwrap_or_else(FileStore::default_dir)))),
        other => Err(Error::Config(format!(
            "unknown storage backend {:?}, expected memory or file",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, HistoryStore};
    pub use nb_core::KeyValueStore;
}
