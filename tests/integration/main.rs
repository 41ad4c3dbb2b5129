//! Integration tests for mindmap
//!
//! These drive the built binary and the public crates together.

use std::process::Command;

use mindmap_core::{Connection, GraphSnapshot, GraphStore, Node, read_document, write_document};
use mindmap_server::{MindMapServer, ServerConfig};

fn mindmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mindmap"))
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help() {
    let output = mindmap().arg("--help").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Live node-link graph store"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_cli_version() {
    let output = mindmap().arg("version").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

/// A document saved from one store and checked by the CLI is clean.
#[test]
fn test_cli_check_saved_document() {
    let mut store = GraphStore::new();
    store.add_node("1", "Root", "").unwrap();
    store.add_node("2", "Child", "1").unwrap();
    store.add_connection("1", "2").unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("map.mmap");
    write_document(&store.full_graph(), &path).unwrap();

    let output = mindmap().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 nodes, 1 links accepted"));
}

#[test]
fn test_cli_normalize_and_check() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("dirty.mmap");
    let output_path = dir.path().join("clean.mmap");
    let dirty = GraphSnapshot {
        nodes: vec![Node::new("1", "Root", "")],
        links: vec![Connection::new("1", "2")],
    };
    write_document(&dirty, &input).unwrap();

    let check = mindmap().arg("check").arg(&input).output().unwrap();
    assert!(!check.status.success());

    let normalize = mindmap()
        .arg("normalize")
        .arg(&input)
        .arg("--out")
        .arg(&output_path)
        .output()
        .unwrap();
    assert!(normalize.status.success());

    let clean = read_document(&output_path).unwrap();
    assert_eq!(clean.nodes, dirty.nodes);
    assert!(clean.links.is_empty());
}

/// Mutations through the shared server state show up as sequenced envelopes.
#[tokio::test]
async fn test_server_state_broadcasts_store_events() {
    let server = MindMapServer::new(GraphStore::new(), ServerConfig::default());
    let state = server.state();
    let mut rx = state.subscribe();

    {
        let mut store = state.store.lock().await;
        store.add_node("1", "Root", "").unwrap();
        store.add_node("2", "Child", "1").unwrap();
        store.add_connection("1", "2").unwrap();
        store.remove_node("1").unwrap();
    }

    let mut kinds = Vec::new();
    for expected_seq in 1..=5u64 {
        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg["sequence"].as_u64(), Some(expected_seq));
        kinds.push(msg["type"].as_str().unwrap().to_string());
    }
    assert_eq!(
        kinds,
        [
            "node_added",
            "node_added",
            "connection_added",
            "connection_removed",
            "node_removed",
        ]
    );

    let graph = state.store.lock().await.full_graph();
    assert_eq!(graph.nodes, vec![Node::new("2", "Child", "1")]);
    assert!(graph.links.is_empty());
}
