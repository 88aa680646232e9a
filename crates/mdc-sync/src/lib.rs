//! MDC Tab Synchronization
//!
//! Keeps every open console converging on the shared store.
//!
//! # Architecture
//!
//! ```text
//!   tab A                         transport                         tab B
//! ┌─────────────┐   notify()   ┌──────────────┐   envelope    ┌─────────────┐
//! │ Broadcaster │ ───────────► │ ChannelHub / │ ────────────► │ Broadcaster │
//! │             │              │ Redis pubsub │               │  1. mirror  │
//! │ self-notify │              └──────────────┘               │  2. trigger │
//! └──────┬──────┘                                             └──────┬──────┘
//!        │                 shared store (last writer wins)           │
//!        └──────────────► StorageChange stream ──────── fallback ────┘
//! ```
//!
//! Consumers normally do not subscribe directly: [`use_sync`] mounts a
//! [`SyncHook`] that runs a callback on mount, on every matching event and
//! on a polling interval, so a missed message heals within one interval.
//!
//! # Usage
//!
//! ```rust,ignore
//! let hub = ChannelHub::new("mdc_sync_channel");
//! let store = Store::new(storage, TabId::generate());
//! let sync = Broadcaster::start(hub, store, SyncConfig::default())?;
//!
//! let hook = use_sync(&sync, &[SyncEvent::CrewsUpdated], move || refresh(), None);
//! sync.notify(SyncEvent::CrewsUpdated, None);
//! ```

mod broadcaster;
mod config;
mod error;
mod event;
mod hook;
mod redis_transport;
mod transport;

pub use broadcaster::{Broadcaster, Callback, Subscription};
pub use config::{SyncConfig, DEFAULT_CHANNEL_NAME, DEFAULT_POLL_INTERVAL};
pub use error::{SyncError, SyncResult};
pub use event::{Envelope, SyncEvent, SyncMessage, SyncPayload, FALLBACK_EVENTS};
pub use hook::{use_sync, LatestCallback, SyncHook};
pub use redis_transport::RedisTransport;
pub use transport::{ChannelHub, Transport, DEFAULT_HUB_CAPACITY};
