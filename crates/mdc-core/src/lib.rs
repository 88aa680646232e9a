//! MDC Core Library
//!
//! Domain models and operations of the dispatch console. Every operation
//! runs through a [`Console`] tab: reads come from the shared store, and
//! every write is followed by a sync notification carrying the new value.

pub mod activity;
pub mod call;
pub mod config;
pub mod console;
pub mod crew;
pub mod dispatcher;
pub mod emergency;
pub mod error;
pub mod notifier;
pub mod permissions;
pub mod presence;
pub mod quiz;
pub mod restrictions;
pub mod sanitize;
pub mod settings;
pub mod shift;
pub mod user;

pub use config::{MdcConfig, StorageBackend};
pub use console::{Console, Origin};
pub use error::{MdcError, MdcResult};
pub use notifier::WebNotifier;

/// Current UTC time as RFC 3339, the format every stored timestamp uses.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
