//! Console handles.
//!
//! An [`Origin`] is the shared medium (storage plus sync transport) that
//! every tab of one deployment joins. A [`Console`] is one tab: a
//! broadcaster bound to a tab identity, through which every domain
//! operation reads and writes.

use std::sync::Arc;

use mdc_store::{MemoryStorage, RedisStorage, Storage, Store, TabId};
use mdc_sync::{Broadcaster, ChannelHub, RedisTransport, SyncEvent, SyncPayload, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{MdcConfig, StorageBackend};
use crate::error::MdcResult;

/// Shared storage and transport for every tab of one deployment.
#[derive(Clone)]
pub struct Origin {
    storage: Arc<dyn Storage>,
    transport: Arc<dyn Transport>,
    config: Arc<MdcConfig>,
}

impl Origin {
    /// Open the backend named in `config`.
    pub async fn open(config: MdcConfig) -> MdcResult<Self> {
        match config.storage {
            StorageBackend::Memory => Ok(Self::in_memory(config)),
            StorageBackend::Redis => {
                let storage = RedisStorage::connect(&config.redis_url, &config.key_prefix).await?;
                let transport =
                    RedisTransport::connect(&config.redis_url, &config.channel_name).await?;
                info!(url = %config.redis_url, "Opened Redis origin");
                Ok(Self {
                    storage: Arc::new(storage),
                    transport,
                    config: Arc::new(config),
                })
            }
        }
    }

    pub fn in_memory(config: MdcConfig) -> Self {
        debug!(channel = %config.channel_name, "Opened in-memory origin");
        Self {
            storage: Arc::new(MemoryStorage::new()),
            transport: ChannelHub::new(config.channel_name.clone()),
            config: Arc::new(config),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn config(&self) -> &MdcConfig {
        &self.config
    }

    /// Join as a new tab.
    pub fn console(&self, tab: TabId) -> MdcResult<Console> {
        let store = Store::new(self.storage.clone(), tab);
        let sync = Broadcaster::start(self.transport.clone(), store, self.config.sync_config())?;
        Ok(Console {
            sync,
            config: self.config.clone(),
        })
    }
}

/// One tab's entry point to the console state.
#[derive(Clone)]
pub struct Console {
    sync: Arc<Broadcaster>,
    config: Arc<MdcConfig>,
}

impl Console {
    pub fn sync(&self) -> &Arc<Broadcaster> {
        &self.sync
    }

    pub fn store(&self) -> &Store {
        self.sync.store()
    }

    pub fn config(&self) -> &MdcConfig {
        &self.config
    }

    pub fn tab(&self) -> &TabId {
        self.sync.tab()
    }

    /// Read a collection key, treating a missing or corrupt value as empty.
    pub(crate) async fn load<T>(&self, key: &str) -> MdcResult<T>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.store().get_or(key, T::default()).await?)
    }

    /// Write `value` under `key`, then announce `event` with the new value
    /// attached so other tabs can mirror it.
    pub(crate) async fn commit<T>(&self, key: &str, value: &T, event: SyncEvent) -> MdcResult<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_value(value)?;
        self.store().set(key, &json).await?;
        self.sync.notify(event, Some(SyncPayload::new(key, json)));
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_commit_writes_then_notifies_every_tab() {
        let origin = testing::origin();
        let a = origin.console(TabId::from("a")).unwrap();
        let b = origin.console(TabId::from("b")).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let _sub = b.sync().subscribe(SyncEvent::CrewsUpdated, move || {
            s.fetch_add(1, Ordering::SeqCst);
        });

        a.commit("mdc_crews", &vec![1, 2, 3], SyncEvent::CrewsUpdated)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(seen.load(Ordering::SeqCst) >= 1);
        let stored: Vec<i32> = b.load("mdc_crews").await.unwrap();
        assert_eq!(stored, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_load_missing_key_is_default() {
        let console = testing::console();
        let empty: Vec<String> = console.load("mdc_nothing").await.unwrap();
        assert!(empty.is_empty());
    }
}
