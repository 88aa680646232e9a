//! In-process storage medium.
//!
//! One `MemoryStorage` plays the role of the browser's local storage for a
//! single origin: every tab created on top of the same instance shares it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::client::StoreResult;
use crate::storage::{Storage, StorageChange, TabId, CHANGE_CHANNEL_CAPACITY};

pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    tx: broadcast::Sender<StorageChange>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(BTreeMap::new()),
            tx,
        }
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn announce(&self, origin: &TabId, key: &str) {
        debug!(key = %key, origin = %origin, "MemoryStorage change");
        // No receivers is fine
        let _ = self.tx.send(StorageChange {
            key: key.to_string(),
            origin: origin.clone(),
        });
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, origin: &TabId, key: &str, value: String) -> StoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        self.announce(origin, key);
        Ok(())
    }

    async fn remove(&self, origin: &TabId, key: &str) -> StoreResult<()> {
        let removed = self.entries.write().await.remove(key);
        if removed.is_some() {
            self.announce(origin, key);
        }
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn changes(&self) -> broadcast::Receiver<StorageChange> {
        self.tx.subscribe()
    }
}
