//! Console configuration.
//!
//! Read from `mdc.toml` when present, then overridden by `MDC_STORAGE`,
//! `MDC_REDIS_URL` and `MDC_WEB_URL`.

use std::path::Path;
use std::time::Duration;

use mdc_store::keys::KEY_PREFIX;
use mdc_sync::{SyncConfig, DEFAULT_CHANNEL_NAME};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MdcError, MdcResult};

pub const CONFIG_FILE: &str = "mdc.toml";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Where the shared store and the sync channel live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Everything in this process. Tabs are the web sockets and hooks of
    /// one server.
    #[default]
    Memory,
    /// A Redis instance shared by every process.
    Redis,
}

impl StorageBackend {
    pub fn from_str(s: &str) -> MdcResult<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(MdcError::Config(format!("unknown storage backend '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdcConfig {
    pub storage: StorageBackend,
    pub redis_url: String,
    pub channel_name: String,
    pub key_prefix: String,
    pub poll_interval_ms: u64,
    pub web_host: String,
    pub web_port: u16,
    /// How long panic and Signal 100 alerts stay active.
    pub emergency_window_secs: u64,
    /// Online users without a heartbeat for this long are dropped.
    pub presence_timeout_secs: u64,
}

impl Default for MdcConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            key_prefix: KEY_PREFIX.to_string(),
            poll_interval_ms: 5000,
            web_host: "127.0.0.1".to_string(),
            web_port: 3040,
            emergency_window_secs: 600,
            presence_timeout_secs: 10,
        }
    }
}

impl MdcConfig {
    /// Load `mdc.toml` from the working directory, then apply env overrides.
    pub fn load() -> MdcResult<Self> {
        let mut config = if Path::new(CONFIG_FILE).exists() {
            Self::from_file(Path::new(CONFIG_FILE))?
        } else {
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MdcResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> MdcResult<Self> {
        toml::from_str(raw).map_err(|e| MdcError::Config(e.to_string()))
    }

    fn apply_env(&mut self) -> MdcResult<()> {
        if let Ok(storage) = std::env::var("MDC_STORAGE") {
            self.storage = StorageBackend::from_str(&storage)?;
        }
        if let Ok(url) = std::env::var("MDC_REDIS_URL") {
            self.redis_url = url;
        }
        if let Ok(url) = std::env::var("MDC_WEB_URL") {
            let rest = url
                .trim_start_matches("http://")
                .trim_start_matches("https://")
                .trim_end_matches('/');
            if let Some((host, port)) = rest.rsplit_once(':') {
                self.web_host = host.to_string();
                self.web_port = port
                    .parse()
                    .map_err(|_| MdcError::Config(format!("bad port in MDC_WEB_URL '{}'", url)))?;
            }
        }
        Ok(())
    }

    pub fn web_url(&self) -> String {
        format!("http://{}:{}", self.web_host, self.web_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn emergency_window(&self) -> Duration {
        Duration::from_secs(self.emergency_window_secs)
    }

    pub fn presence_timeout(&self) -> Duration {
        Duration::from_secs(self.presence_timeout_secs)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            channel_name: self.channel_name.clone(),
            key_prefix: self.key_prefix.clone(),
            poll_interval: self.poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sync_defaults() {
        let config = MdcConfig::default();
        assert_eq!(config.sync_config(), SyncConfig::default());
        assert_eq!(config.web_url(), "http://127.0.0.1:3040");
        assert_eq!(config.emergency_window(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MdcConfig::from_toml(
            r#"
            storage = "redis"
            poll_interval_ms = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Redis);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.web_port, 3040);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(matches!(
            StorageBackend::from_str("sqlite"),
            Err(MdcError::Config(_))
        ));
        assert!(MdcConfig::from_toml("storage = \"sqlite\"").is_err());
    }
}
