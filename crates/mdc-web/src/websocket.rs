//! WebSocket bridge. Each connected socket joins the sync channel as its
//! own tab.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::{Sink, SinkExt},
    stream::{Stream, StreamExt},
};
use mdc_store::TabId;
use mdc_sync::{Envelope, SyncMessage, Transport};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Bridge one socket: envelopes from other tabs go out as `SyncMessage`
/// frames, incoming frames are posted under this socket's tab.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, receiver) = socket.split();
    let transport = state.origin.transport().clone();
    bridge(sender, receiver, TabId::generate(), transport).await;
}

/// Relay between one client connection and the sync transport until
/// either side stops.
async fn bridge<S, R, E>(mut sender: S, mut receiver: R, tab: TabId, transport: Arc<dyn Transport>)
where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let mut rx = match transport.subscribe() {
        Ok(rx) => rx,
        Err(e) => {
            warn!(error = %e, "Sync channel unavailable, dropping WebSocket");
            return;
        }
    };
    info!(tab = %tab, "WebSocket client connected");

    let own = tab.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let envelope = match rx.recv().await {
                Ok(envelope) => envelope,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "WebSocket bridge lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if envelope.origin == own {
                continue;
            }
            let json = match serde_json::to_string(&envelope.message) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode sync message");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    let origin = tab.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<SyncMessage>(text.as_str()) {
                    Ok(message) => {
                        debug!(event = %message.event_name, "Forwarding client notification");
                        let envelope = Envelope {
                            origin: origin.clone(),
                            message,
                        };
                        if let Err(e) = transport.post(envelope) {
                            warn!(error = %e, "Failed to post client notification");
                        }
                    }
                    Err(e) => debug!(error = %e, "Ignoring malformed client frame"),
                },
                Message::Close(_) => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!(tab = %tab, "WebSocket client disconnected");
}
