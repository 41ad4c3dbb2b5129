//! WebSocket handling: live graph events out, view commands in

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;
use crate::protocol::{self, ClientMessage, ServerMessage};

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// Nothing is pushed until the view sends `view_ready`; the snapshot it gets
/// back arrives through the same ordered event stream as every later delta.
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    // Subscribe before reading anything so no event after `view_ready` is missed.
    let mut events = state.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Incoming messages from the view
    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => handle_client_message(client_msg, &state_clone).await,
                        Err(e) => {
                            warn!("Failed to parse WebSocket message: {}", e);
                            Some(ServerMessage::Error {
                                message: format!("invalid message: {}", e),
                            })
                        }
                    };
                    if let Some(reply) = reply {
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Outgoing: broadcast events plus direct replies
    let mut send_task = tokio::spawn(async move {
        loop {
            // Drain buffered events first so a reply never overtakes them.
            let outgoing = tokio::select! {
                biased;
                event = events.recv() => match event {
                    Ok(json) => json,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind, {} events skipped", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => match serde_json::to_string(&reply) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("Failed to serialize reply: {}", e);
                            continue;
                        }
                    },
                    None => break,
                },
            };
            if sender.send(Message::Text(outgoing)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

/// Apply a view's message to the store and return the direct reply, if any.
async fn handle_client_message(msg: ClientMessage, state: &ServerState) -> Option<ServerMessage> {
    debug!("Applying client message: {:?}", msg);
    let mut store = state.store.lock().await;
    protocol::apply(&mut store, msg)
}
