//! Typed view over a storage medium, bound to one tab.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::client::StoreResult;
use crate::storage::{Storage, TabId};

/// JSON (de)serializing handle over a shared [`Storage`].
///
/// Cheap to clone. All writes are attributed to the tab the handle was
/// created for.
#[derive(Clone)]
pub struct Store {
    storage: Arc<dyn Storage>,
    origin: TabId,
}

impl Store {
    pub fn new(storage: Arc<dyn Storage>, origin: TabId) -> Self {
        Self { storage, origin }
    }

    pub fn origin(&self) -> &TabId {
        &self.origin
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The same medium, attributed to another tab.
    pub fn for_tab(&self, origin: TabId) -> Self {
        Self {
            storage: self.storage.clone(),
            origin,
        }
    }

    /// Read and decode `key`. Fails on malformed JSON.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.storage.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read and decode `key`, falling back to `default` when the key is
    /// missing or holds something that does not decode.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> StoreResult<T> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(default);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value does not decode, using default");
                Ok(default)
            }
        }
    }

    pub async fn get_value(&self, key: &str) -> StoreResult<Option<Value>> {
        self.get(key).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set(&self.origin, key, json).await
    }

    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        self.storage.remove(&self.origin, key).await
    }

    pub async fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.storage.keys(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Unit {
        id: u32,
        name: String,
    }

    fn store() -> Store {
        Store::new(Arc::new(MemoryStorage::new()), TabId::from("tab-1"))
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let store = store();
        let units = vec![Unit { id: 1, name: "NU-12".into() }];
        store.set("mdc_units", &units).await.unwrap();

        let loaded: Vec<Unit> = store.get_or("mdc_units", Vec::new()).await.unwrap();
        assert_eq!(loaded, units);
    }

    #[tokio::test]
    async fn test_get_or_falls_back_on_corrupt_json() {
        let store = store();
        store
            .storage()
            .set(store.origin(), "mdc_units", "{not json".to_string())
            .await
            .unwrap();

        let loaded: Vec<Unit> = store.get_or("mdc_units", Vec::new()).await.unwrap();
        assert!(loaded.is_empty());
        assert!(store.get::<Vec<Unit>>("mdc_units").await.is_err());
    }

    #[tokio::test]
    async fn test_for_tab_shares_medium() {
        let a = store();
        let b = a.for_tab(TabId::from("tab-2"));
        a.set("mdc_flag", &true).await.unwrap();

        assert_eq!(b.get::<bool>("mdc_flag").await.unwrap(), Some(true));
        assert_eq!(b.origin().as_str(), "tab-2");
    }
}
