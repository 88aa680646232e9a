//! Sync layer errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Transport unavailable: {0}")]
    Transport(String),

    #[error("Transport closed: {0}")]
    Closed(String),

    #[error("Unknown sync event: {0}")]
    UnknownEvent(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store error: {0}")]
    Store(#[from] mdc_store::StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
