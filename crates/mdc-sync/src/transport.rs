//! Cross-tab transports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::event::Envelope;

/// Default hub capacity (envelopes). A lagging tab skips ahead and
/// re-fetches everything.
pub const DEFAULT_HUB_CAPACITY: usize = 256;

/// A same-origin broadcast medium.
///
/// Delivery is fire-and-forget and unordered across posters. Every
/// subscriber sees every envelope, including its own; receivers drop the
/// ones whose origin is themselves.
pub trait Transport: Send + Sync {
    fn channel_name(&self) -> &str;

    fn post(&self, envelope: Envelope) -> SyncResult<()>;

    /// Open a receiving end. Fails if the medium is unavailable.
    fn subscribe(&self) -> SyncResult<broadcast::Receiver<Envelope>>;
}

/// In-process named broadcast channel shared by every tab of one origin.
pub struct ChannelHub {
    name: String,
    tx: broadcast::Sender<Envelope>,
    closed: AtomicBool,
}

impl ChannelHub {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_capacity(name, DEFAULT_HUB_CAPACITY)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Arc<Self> {
        let name = name.into();
        debug!(channel = %name, capacity, "ChannelHub::new");
        let (tx, _rx) = broadcast::channel(capacity);
        Arc::new(Self {
            name,
            tx,
            closed: AtomicBool::new(false),
        })
    }

    /// Refuse further posts and subscriptions.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of open receiving ends.
    pub fn endpoint_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Transport for ChannelHub {
    fn channel_name(&self) -> &str {
        &self.name
    }

    fn post(&self, envelope: Envelope) -> SyncResult<()> {
        if self.is_closed() {
            return Err(SyncError::Closed(self.name.clone()));
        }
        // No receivers is OK
        let _ = self.tx.send(envelope);
        Ok(())
    }

    fn subscribe(&self) -> SyncResult<broadcast::Receiver<Envelope>> {
        if self.is_closed() {
            return Err(SyncError::Transport(format!(
                "channel '{}' is closed",
                self.name
            )));
        }
        Ok(self.tx.subscribe())
    }
}
