//! Poke a running `mdc serve` from another process.
//!
//! The server re-announces the event through its own broadcaster, which
//! reaches every connected console.

use std::time::Duration;

use mdc_sync::{SyncEvent, SyncMessage, SyncPayload};
use tracing::{debug, warn};

/// Sends notifications to the web server over HTTP.
#[derive(Clone)]
pub struct WebNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebNotifier {
    pub fn new(base_url: &str) -> Self {
        debug!(base_url = %base_url, "WebNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the event to `/internal/notify`. Returns whether the server
    /// accepted it; an unreachable server is not an error.
    pub async fn notify(&self, event: SyncEvent, payload: Option<SyncPayload>) -> bool {
        let url = format!("{}/internal/notify", self.base_url);
        let message = SyncMessage::new(event, payload);

        debug!(url = %url, event = %event, "Sending notification");

        match self.client.post(&url).json(&message).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(event = %event, "Notification delivered");
                true
            }
            Ok(response) => {
                warn!(
                    event = %event,
                    status_code = %response.status(),
                    "Notification rejected"
                );
                false
            }
            Err(e) => {
                debug!(
                    event = %event,
                    error = %e,
                    url = %url,
                    "Failed to send notification (mdc serve may not be running)"
                );
                false
            }
        }
    }
}
