//! HTTP + WebSocket bridge between the graph store and remote views

pub mod handlers;
pub mod protocol;
pub mod router;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::Arc;

use mindmap_core::GraphStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast};
use tracing::{error, info};

use crate::protocol::EventEnvelope;

/// Messages buffered per subscriber before it is reported as lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared state handed to every handler.
///
/// The store sits behind a single async mutex so REST calls and every socket
/// funnel into one writer. A listener registered at construction turns each
/// store event into a sequenced JSON envelope on `event_tx`.
pub struct ServerState {
    pub store: Mutex<GraphStore>,
    pub event_tx: broadcast::Sender<String>,
}

impl ServerState {
    pub fn new(store: GraphStore) -> Self {
        Self::with_capacity(store, EVENT_CHANNEL_CAPACITY)
    }

    /// Like `new`, buffering at most `capacity` events per receiver.
    pub fn with_capacity(mut store: GraphStore, capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);

        let tx = event_tx.clone();
        let mut sequence = 0u64;
        store.subscribe(move |event| {
            sequence += 1;
            match serde_json::to_string(&EventEnvelope { sequence, event }) {
                // No receivers just means no view is connected.
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(e) => error!("Failed to serialize graph event: {}", e),
            }
        });

        ServerState {
            store: Mutex::new(store),
            event_tx,
        }
    }

    /// New receiver for all events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.event_tx.subscribe()
    }

    /// Number of connected event receivers.
    pub fn receiver_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

/// The bridge server: owns the shared state and serves it.
pub struct MindMapServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl MindMapServer {
    pub fn new(store: GraphStore, config: ServerConfig) -> Self {
        MindMapServer {
            state: Arc::new(ServerState::new(store)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn start(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.address()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr: SocketAddr = listener.local_addr()?;
        info!("Mindmap server listening on http://{}", addr);

        let app = router::create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Mindmap server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    fn sequence_of(json: &str) -> u64 {
        let msg: serde_json::Value = serde_json::from_str(json).unwrap();
        msg["sequence"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_lagging_receiver_sees_sequence_gap() {
        let state = ServerState::with_capacity(GraphStore::new(), 2);
        let mut rx = state.subscribe();

        {
            let mut store = state.store.lock().await;
            for id in ["a", "b", "c", "d", "e"] {
                store.add_node(id, id, "").unwrap();
            }
        }

        match rx.recv().await {
            Err(RecvError::Lagged(skipped)) => assert_eq!(skipped, 3),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(sequence_of(&rx.recv().await.unwrap()), 4);
        assert_eq!(sequence_of(&rx.recv().await.unwrap()), 5);
    }

    #[tokio::test]
    async fn test_view_ready_after_lag_resyncs() {
        let state = ServerState::with_capacity(GraphStore::new(), 2);
        let mut rx = state.subscribe();

        {
            let mut store = state.store.lock().await;
            for id in ["a", "b", "c"] {
                store.add_node(id, id, "").unwrap();
            }
            store.add_connection("a", "c").unwrap();
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(2))));
        assert_eq!(sequence_of(&rx.recv().await.unwrap()), 3);
        assert_eq!(sequence_of(&rx.recv().await.unwrap()), 4);

        let expected = {
            let mut store = state.store.lock().await;
            store.on_view_ready();
            serde_json::to_value(store.full_graph()).unwrap()
        };
        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg["type"], "graph_updated");
        assert_eq!(msg["sequence"].as_u64(), Some(5));
        assert_eq!(msg["graph"], expected);
    }
}
