//! MDC Shared Store
//!
//! The origin-wide key-value medium every console tab reads and writes.
//! Values are opaque JSON documents; the store does not know the shape
//! of crews, calls or users.

pub mod client;
pub mod keys;
pub mod memory;
pub mod redis_storage;
pub mod storage;
pub mod store;

pub use client::{init_pool, RedisPool, StoreError, StoreResult};
pub use memory::MemoryStorage;
pub use redis_storage::RedisStorage;
pub use storage::{Storage, StorageChange, TabId};
pub use store::Store;
