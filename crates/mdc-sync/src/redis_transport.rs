//! Redis pub/sub transport, for tabs living in different processes.

use std::sync::Arc;

use futures::StreamExt;
use mdc_store::{init_pool, RedisPool};
use redis::AsyncCommands;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::event::Envelope;
use crate::transport::{Transport, DEFAULT_HUB_CAPACITY};

pub struct RedisTransport {
    channel: String,
    pool: RedisPool,
    tx: broadcast::Sender<Envelope>,
    listener: JoinHandle<()>,
}

impl RedisTransport {
    /// Connect and subscribe to `channel`.
    ///
    /// Connection errors are returned as-is; there is no offline mode.
    pub async fn connect(redis_url: &str, channel: &str) -> SyncResult<Arc<Self>> {
        let pool = init_pool(redis_url).await?;
        let client = redis::Client::open(redis_url)?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let (tx, _rx) = broadcast::channel(DEFAULT_HUB_CAPACITY);
        let forward = tx.clone();
        let listener = tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "Unreadable sync payload");
                        continue;
                    }
                };
                match serde_json::from_str::<Envelope>(&payload) {
                    Ok(envelope) => {
                        let _ = forward.send(envelope);
                    }
                    // Unknown event names end up here
                    Err(e) => debug!(error = %e, payload = %payload, "Ignoring sync message"),
                }
            }
            debug!("Sync subscription ended");
        });

        info!(url = %redis_url, channel = %channel, "Redis sync transport connected");

        Ok(Arc::new(Self {
            channel: channel.to_string(),
            pool,
            tx,
            listener,
        }))
    }
}

impl Drop for RedisTransport {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl Transport for RedisTransport {
    fn channel_name(&self) -> &str {
        &self.channel
    }

    fn post(&self, envelope: Envelope) -> SyncResult<()> {
        let json = serde_json::to_string(&envelope)?;
        let mut conn = self.pool.clone();
        let channel = self.channel.clone();
        tokio::spawn(async move {
            if let Err(e) = conn.publish::<_, _, ()>(&channel, json).await {
                warn!(channel = %channel, error = %e, "Failed to publish sync message");
            }
        });
        Ok(())
    }

    fn subscribe(&self) -> SyncResult<broadcast::Receiver<Envelope>> {
        Ok(self.tx.subscribe())
    }
}
