//! Internal notification endpoint.

use axum::{extract::State, http::StatusCode, Json};
use mdc_sync::SyncMessage;
use tracing::info;

use crate::state::AppState;

/// Re-announce a notification from another process through the server's
/// broadcaster, which reaches every connected tab.
pub async fn notify(State(state): State<AppState>, Json(msg): Json<SyncMessage>) -> StatusCode {
    info!(event = %msg.event_name, "Received internal notification");
    state.console.sync().notify(msg.event_name, msg.data);
    StatusCode::OK
}
