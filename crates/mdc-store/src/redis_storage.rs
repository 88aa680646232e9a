//! Redis-backed storage medium.
//!
//! Values live as plain JSON strings under their key. Every write is also
//! published on `<prefix>storage_events` so that consoles in other processes
//! sharing the same Redis see the change through [`Storage::changes`].

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{init_pool, RedisPool, StoreResult};
use crate::storage::{Storage, StorageChange, TabId, CHANGE_CHANNEL_CAPACITY};

pub struct RedisStorage {
    pool: RedisPool,
    events_channel: String,
    tx: broadcast::Sender<StorageChange>,
    listener: JoinHandle<()>,
}

impl RedisStorage {
    /// Connect to Redis and start relaying change events.
    ///
    /// Fails if either the command connection or the pub/sub connection
    /// cannot be established.
    pub async fn connect(redis_url: &str, key_prefix: &str) -> StoreResult<Self> {
        let pool = init_pool(redis_url).await?;
        let client = redis::Client::open(redis_url)?;
        let events_channel = format!("{}storage_events", key_prefix);

        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.subscribe(&events_channel).await?;

        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let forward = tx.clone();
        let listener = tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "Unreadable storage event payload");
                        continue;
                    }
                };
                match serde_json::from_str::<StorageChange>(&payload) {
                    Ok(change) => {
                        let _ = forward.send(change);
                    }
                    Err(e) => debug!(error = %e, "Ignoring malformed storage event"),
                }
            }
            debug!("Storage event subscription ended");
        });

        info!(url = %redis_url, channel = %events_channel, "Redis storage connected");

        Ok(Self {
            pool,
            events_channel,
            tx,
            listener,
        })
    }

    async fn announce(&self, origin: &TabId, key: &str) -> StoreResult<()> {
        let change = StorageChange {
            key: key.to_string(),
            origin: origin.clone(),
        };
        let json = serde_json::to_string(&change)?;
        let mut conn = self.pool.clone();
        conn.publish::<_, _, ()>(&self.events_channel, json).await?;
        Ok(())
    }
}

impl Drop for RedisStorage {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[async_trait]
impl Storage for RedisStorage {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.pool.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, origin: &TabId, key: &str, value: String) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        conn.set::<_, _, ()>(key, value).await?;
        self.announce(origin, key).await
    }

    async fn remove(&self, origin: &TabId, key: &str) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        let removed: i64 = conn.del(key).await?;
        if removed > 0 {
            self.announce(origin, key).await?;
        }
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.pool.clone();
        let pattern = format!("{}*", prefix);
        let mut scan: redis::AsyncIter<String> = conn.scan_match(&pattern).await?;
        let mut keys = Vec::new();
        while let Some(key) = scan.next_item().await {
            keys.push(key);
        }
        drop(scan);
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    fn changes(&self) -> broadcast::Receiver<StorageChange> {
        self.tx.subscribe()
    }
}
