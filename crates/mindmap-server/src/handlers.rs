//! REST API handlers for the mindmap server

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use mindmap_core::{GraphSnapshot, LoadReport};
use serde::Serialize;
use tracing::info;

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub nodes: usize,
    pub links: usize,
    pub views: usize,
}

/// Get the current graph in document form.
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Json<GraphSnapshot> {
    let store = state.store.lock().await;
    Json(store.full_graph())
}

/// Replace the whole graph with the posted document.
///
/// Runs the regular load procedure, so connected views see the removals and
/// additions as individual events.
pub async fn put_graph(
    State(state): State<Arc<ServerState>>,
    Json(doc): Json<GraphSnapshot>,
) -> Json<LoadReport> {
    let mut store = state.store.lock().await;
    let report = store.load_document(&doc);
    info!(
        "Graph replaced: {} nodes, {} links ({} rejected)",
        report.nodes_added,
        report.links_added,
        report.nodes_rejected + report.links_rejected
    );
    Json(report)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let store = state.store.lock().await;
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        nodes: store.node_count(),
        links: store.connection_count(),
        views: state.receiver_count(),
    };
    Json(health)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::{Connection, GraphStore, Node};

    #[tokio::test]
    async fn test_put_then_get_graph() {
        let state = Arc::new(ServerState::new(GraphStore::new()));
        let doc = GraphSnapshot {
            nodes: vec![Node::new("1", "Root", ""), Node::new("2", "Child", "1")],
            links: vec![Connection::new("1", "2"), Connection::new("2", "3")],
        };

        let Json(report) = put_graph(State(Arc::clone(&state)), Json(doc.clone())).await;
        assert_eq!(report.nodes_added, 2);
        assert_eq!(report.links_rejected, 1);

        let Json(graph) = get_graph(State(state)).await;
        assert_eq!(graph.nodes, doc.nodes);
        assert_eq!(graph.links, vec![Connection::new("1", "2")]);
    }

    #[tokio::test]
    async fn test_put_graph_broadcasts_events() {
        let state = Arc::new(ServerState::new(GraphStore::new()));
        let mut rx = state.subscribe();

        let doc = GraphSnapshot {
            nodes: vec![Node::new("1", "Root", "")],
            links: Vec::new(),
        };
        put_graph(State(Arc::clone(&state)), Json(doc)).await;

        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg["type"], "node_added");
        assert_eq!(msg["sequence"], 1);
    }
}
