//! Prediction history: a capped, most-recent-first list persisted as one
//! JSON document in a key-value slot.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::models::{HistoryEntry, PredictionResult};

pub const MAX_HISTORY_ENTRIES: usize = 50;
pub const HISTORY_KEY: &str = "predictionHistory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Carousel step over `len` entries, wrapping at both ends.
pub fn rotate(index: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    let index = index.min(len - 1);
    match direction {
        Direction::Left => (index + len - 1) % len,
        Direction::Right => (index + 1) % len,
    }
}

#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    limit: usize,
}

impl HistoryStore {
    /// Reads the persisted list. A corrupt document is logged and treated as
    /// an empty history; only storage failures are returned.
    pub async fn load(store: Arc<dyn KeyValueStore>, limit: usize) -> Result<Self> {
        let limit = limit.clamp(1, MAX_HISTORY_ENTRIES);
        let raw = store
            .get(HISTORY_KEY)
            .await
            .context("failed to read prediction history")?;

        let mut entries = match raw {
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("Discarding unreadable prediction history: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        entries.truncate(limit);

        info!("Loaded {} history entries", entries.len());

        Ok(Self {
            store,
            entries: Arc::new(Mutex::new(entries)),
            limit,
        })
    }

    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// Prepends a new entry, evicting the oldest beyond the cap.
    pub async fn record(
        &self,
        image_preview: String,
        result: PredictionResult,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            id: Uuid::now_v7().to_string(),
            image_preview,
            result,
            timestamp: Utc::now(),
        };

        let mut guard = self.entries.lock().await;
        let mut next = Vec::with_capacity(self.limit);
        next.push(entry.clone());
        next.extend(guard.iter().take(self.limit - 1).cloned());
        self.persist(&next).await?;
        *guard = next;

        Ok(entry)
    }

    /// Returns `false` when no entry had that id.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        let next: Vec<HistoryEntry> = guard
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        if next.len() == guard.len() {
            return Ok(false);
        }
        self.persist(&next).await?;
        *guard = next;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<()> {
        let mut guard = self.entries.lock().await;
        self.persist(&[]).await?;
        guard.clear();
        Ok(())
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        if entries.is_empty() {
            return self
                .store
                .remove(HISTORY_KEY)
                .await
                .context("failed to clear prediction history");
        }

        let serialized = serde_json::to_string(entries)?;
        self.store
            .set(HISTORY_KEY, serialized)
            .await
            .context("failed to save prediction history")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MemoryStore {
        slots: StdMutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.slots.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            self.slots.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.slots.lock().unwrap().remove(key);
            Ok(())
        }
    }

    /// Serves reads but refuses every write.
    struct FailingStore {
        seeded: Option<String>,
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(self.seeded.clone())
        }

        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            anyhow::bail!("disk full")
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    fn prediction(n: usize) -> PredictionResult {
        PredictionResult {
            label: format!("Tomato___sample_{n}"),
            confidence: 0.5,
            per_class_scores: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_keeps_fifty_most_recent_first() {
        let store = Arc::new(MemoryStore::default());
        let history = HistoryStore::load(store.clone(), MAX_HISTORY_ENTRIES)
            .await
            .unwrap();

        for n in 0..60 {
            history
                .record(format!("preview-{n}"), prediction(n))
                .await
                .unwrap();
        }

        let entries = history.entries().await;
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].result.label, "Tomato___sample_59");
        assert_eq!(entries[49].result.label, "Tomato___sample_10");

        let persisted: Vec<HistoryEntry> =
            serde_json::from_str(&store.get(HISTORY_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(persisted, entries);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let history = HistoryStore::load(Arc::new(MemoryStore::default()), 50)
            .await
            .unwrap();
        let a = history.record("a".into(), prediction(1)).await.unwrap();
        let b = history.record("b".into(), prediction(2)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_corrupt_history_loads_empty() {
        let store = Arc::new(MemoryStore::default());
        store.set(HISTORY_KEY, "{definitely not a list".into()).await.unwrap();

        let history = HistoryStore::load(store, 50).await.unwrap();
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_removing_last_entry_deletes_slot() {
        let store = Arc::new(MemoryStore::default());
        let history = HistoryStore::load(store.clone(), 50).await.unwrap();
        let entry = history.record("p".into(), prediction(0)).await.unwrap();
        assert!(store.get(HISTORY_KEY).await.unwrap().is_some());

        assert!(!history.remove("missing").await.unwrap());
        assert!(history.remove(&entry.id).await.unwrap());
        assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_deletes_slot() {
        let store = Arc::new(MemoryStore::default());
        let history = HistoryStore::load(store.clone(), 50).await.unwrap();
        history.record("p".into(), prediction(0)).await.unwrap();
        history.record("q".into(), prediction(1)).await.unwrap();

        history.clear().await.unwrap();
        assert!(history.is_empty().await);
        assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_history_unchanged() {
        let history = HistoryStore::load(Arc::new(FailingStore { seeded: None }), 50)
            .await
            .unwrap();
        assert!(history.record("p".into(), prediction(0)).await.is_err());
        assert_eq!(history.len().await, 0);

        let existing = HistoryEntry {
            id: "kept".into(),
            image_preview: "p".into(),
            result: prediction(1),
            timestamp: Utc::now(),
        };
        let seeded = serde_json::to_string(&vec![existing.clone()]).unwrap();
        let history = HistoryStore::load(Arc::new(FailingStore { seeded: Some(seeded) }), 50)
            .await
            .unwrap();

        assert!(history.remove("kept").await.is_err());
        assert!(history.clear().await.is_err());
        assert!(history.record("q".into(), prediction(2)).await.is_err());
        assert_eq!(history.entries().await, vec![existing]);
    }

    #[tokio::test]
    async fn test_limit_never_exceeds_fifty() {
        let history = HistoryStore::load(Arc::new(MemoryStore::default()), 500)
            .await
            .unwrap();
        for n in 0..60 {
            history
                .record(format!("preview-{n}"), prediction(n))
                .await
                .unwrap();
        }
        assert_eq!(history.len().await, MAX_HISTORY_ENTRIES);
    }

    #[test]
    fn test_rotate_wraps() {
        assert_eq!(rotate(0, 3, Direction::Left), 2);
        assert_eq!(rotate(2, 3, Direction::Right), 0);
        assert_eq!(rotate(1, 3, Direction::Right), 2);
        assert_eq!(rotate(0, 0, Direction::Right), 0);
    }
}
