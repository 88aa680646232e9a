//! Sync layer settings.

use std::time::Duration;

use mdc_store::keys::KEY_PREFIX;

/// Name of the broadcast channel every tab joins.
pub const DEFAULT_CHANNEL_NAME: &str = "mdc_sync_channel";

/// Poll interval used by hooks mounted without an explicit one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub channel_name: String,
    /// Storage changes under keys without this prefix never reach the fallback.
    pub key_prefix: String,
    pub poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            key_prefix: KEY_PREFIX.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
