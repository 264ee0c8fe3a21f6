//! Tracking channel over WebSocket
//!
//! The server sends `initializeLocations` on join and `locationUpdate` for
//! every registry change afterwards. A client may send
//! `{"type":"resubscribe"}` for a fresh snapshot on the same connection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::Caller;
use crate::fanout::{ChannelSubscriber, ConnectionId};
use crate::state::AppState;
use tanod_core::ViewerCommand;

/// Upgrade to a WebSocket joined to the tracking channel
pub async fn tracking_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    caller: Caller,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, caller))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, caller: Caller) {
    let id = ConnectionId::new();
    let viewer = caller.identity().officer_id.clone();
    let (subscriber, mut outbound) = ChannelSubscriber::new(state.config.viewer_queue);

    if !state.fanout.subscribe(id, Arc::new(subscriber)).await {
        warn!(connection_id = %id, viewer = %viewer, "Could not join tracking channel");
        let _ = socket.close().await;
        return;
    }
    info!(connection_id = %id, viewer = %viewer, "Tracking socket opened");

    loop {
        tokio::select! {
            message = outbound.recv() => {
                // `None` means the hub dropped this viewer
                let Some(message) = message else { break };
                let text = match serde_json::to_string(message.as_ref()) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(connection_id = %id, error = %e, "Failed to encode tracking message");
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ViewerCommand>(&text) {
                    Ok(ViewerCommand::Resubscribe) => {
                        if !state.fanout.resubscribe(id).await {
                            break;
                        }
                    }
                    Err(e) => debug!(connection_id = %id, error = %e, "Ignoring viewer message"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection_id = %id, error = %e, "Tracking socket error");
                    break;
                }
            },
        }
    }

    state.fanout.unsubscribe(id);
    info!(connection_id = %id, viewer = %viewer, "Tracking socket closed");
}
