//! Bounded, newest-first log of past searches.
//!
//! The whole log lives under one key and is rewritten on every change; there
//! are no partial updates.

use std::sync::Arc;
use nb_core::{Error, HistoryItem, KeyValueStore, Result};
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "moatalk_history";
pub const MAX_HISTORY: usize = 50;

/// Items sharing one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a> {
    pub date: &'a str,
    pub items: Vec<&'a HistoryItem>,
}

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    items: Vec<HistoryItem>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("items", &self.items.len())
            .finish()
    }
}

impl HistoryStore {
    /// Reads the persisted log. Unreadable content is logged and replaced by an
    /// empty log; only a failing backend is an error.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let items = match store.get(HISTORY_KEY).await? {
            None => Vec::new(),
            Some(blob) => match decode(&blob) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Ignoring unreadable search history: {}", e);
                    Vec::new()
                }
            },
        };
        debug!("Loaded {} history items", items.len());
        Ok(Self { store, items })
    }

    /// Newest first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub async fn append(&mut self, item: HistoryItem) -> Result<()> {
        self.items.insert(0, item);
        self.items.truncate(MAX_HISTORY);
        self.persist().await
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.items)?;
        self.store.set(HISTORY_KEY, &blob).await
    }

    /// Groups by `date`: most recent date first, each group oldest to newest.
    pub fn grouped_by_date(&self) -> Vec<DateGroup<'_>> {
        let mut groups: Vec<DateGroup<'_>> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|g| g.date == item.date) {
                Some(group) => group.items.push(item),
                None => groups.push(DateGroup {
                    date: &item.date,
                    items: vec![item],
                }),
            }
        }
        for group in &mut groups {
            group.items.sort_by_key(|item| item.timestamp);
        }
        groups.sort_by_key(|group| std::cmp::Reverse(newest_in(group)));
        groups
    }
}

fn newest_in(group: &DateGroup<'_>) -> i64 {
    group.items.iter().map(|item| item.timestamp).max().unwrap_or(i64::MIN)
}

fn decode(blob: &str) -> Result<Vec<HistoryItem>> {
    serde_json::from_str(blob).map_err(|e| Error::PersistenceRead(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryStore;
    use chrono::{TimeZone, Utc};
    use nb_core::AppData;

    fn item_at(query: &str, day: u32, hour: u32) -> HistoryItem {
        let when = Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap();
        HistoryItem::at(query, AppData::default(), when)
    }

    #[tokio::test]
    async fn test_append_keeps_fifty_newest() {
        let backend = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(backend.clone()).await.unwrap();
        for i in 0..51 {
            history
                .append(HistoryItem::at(format!("q{}", i), AppData::default(), Utc.timestamp_millis_opt(i).unwrap()))
                .await
                .unwrap();
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.items()[0].query, "q50");
        assert_eq!(history.items()[49].query, "q1");

        let reloaded = HistoryStore::load(backend).await.unwrap();
        assert_eq!(reloaded.items(), history.items());
    }

    #[tokio::test]
    async fn test_clear_then_load_is_empty() {
        let backend = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::load(backend.clone()).await.unwrap();
        history.append(item_at("경제", 19, 9)).await.unwrap();
        history.clear().await.unwrap();
        assert!(history.is_empty());

        let reloaded = HistoryStore::load(backend.clone()).await.unwrap();
        assert!(reloaded.is_empty());
        assert_eq!(backend.get(HISTORY_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(HISTORY_KEY, "{not json").await.unwrap();
        let mut history = HistoryStore::load(backend.clone()).await.unwrap();
        assert!(history.is_empty());

        history.append(item_at("경제", 19, 9)).await.unwrap();
        let reloaded = HistoryStore::load(backend).await.unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new())).await.unwrap();
        let item = item_at("반도체", 18, 8);
        let id = item.id.clone();
        history.append(item).await.unwrap();
        assert_eq!(history.get(&id).map(|i| i.query.as_str()), Some("반도체"));
        assert!(history.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_grouped_by_date() {
        let mut history = HistoryStore::load(Arc::new(MemoryStore::new())).await.unwrap();
        history.append(item_at("a", 17, 9)).await.unwrap();
        history.append(item_at("b", 19, 8)).await.unwrap();
        history.append(item_at("c", 19, 12)).await.unwrap();
        history.append(item_at("d", 18, 10)).await.unwrap();

        let groups = history.grouped_by_date();
        let dates: Vec<_> = groups.iter().map(|g| g.date).collect();
        assert_eq!(dates, vec!["2026년 10월 19일", "2026년 10월 18일", "2026년 10월 17일"]);

        let first: Vec<_> = groups[0].items.iter().map(|i| i.query.as_str()).collect();
        assert_eq!(first, vec!["b", "c"]);
    }
}
