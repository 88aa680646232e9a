//! The storage medium abstraction.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::client::StoreResult;

/// Capacity of the change-notification channel every backend exposes.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Identity of one console tab. Writes carry it so a tab can tell its own
/// changes apart from everybody else's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// A fresh random tab identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A key was written or removed by `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChange {
    pub key: String,
    pub origin: TabId,
}

/// An origin-wide key-value medium holding JSON text.
///
/// Every cell is independent and last-writer-wins; there are no
/// transactions spanning keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Raw JSON text stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key` and announce the change.
    async fn set(&self, origin: &TabId, key: &str, value: String) -> StoreResult<()>;

    /// Delete `key` and announce the change.
    async fn remove(&self, origin: &TabId, key: &str) -> StoreResult<()>;

    /// All keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Stream of change notifications for every write made through any handle.
    fn changes(&self) -> broadcast::Receiver<StorageChange>;
}
