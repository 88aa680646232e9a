//! Application state.

use mdc_core::{Console, MdcResult, Origin};
use mdc_store::TabId;

/// Tab id the server's own console uses.
pub const SERVER_TAB: &str = "server";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared medium; each websocket joins it as its own tab.
    pub origin: Origin,
    /// The server's own tab. REST writes are attributed to it.
    pub console: Console,
}

impl AppState {
    pub fn new(origin: Origin) -> MdcResult<Self> {
        let console = origin.console(TabId::from(SERVER_TAB))?;
        Ok(Self { origin, console })
    }
}
