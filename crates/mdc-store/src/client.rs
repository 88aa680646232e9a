//! Store errors and Redis connection management.

use redis::aio::ConnectionManager;
use thiserror::Error;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Redis connection pool. ConnectionManager multiplexes internally and
/// is Clone, so callers clone it to get a mutable handle per operation.
pub type RedisPool = ConnectionManager;

/// Initialize a Redis connection pool from a URL.
///
/// Example URL: `redis://127.0.0.1:6379`
pub async fn init_pool(redis_url: &str) -> StoreResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}
