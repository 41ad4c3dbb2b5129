//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::Context;
use mindmap_core::{GraphStore, LoadReport, read_document, write_document};
use mindmap_server::{MindMapServer, ServerConfig};

/// Seed the small demo graph: a root with two connected children.
pub fn seed_demo(store: &mut GraphStore) -> anyhow::Result<()> {
    store.add_node("1", "Root Node", "")?;
    store.add_node("2", "Child 1", "1")?;
    store.add_node("3", "Child 2", "1")?;
    store.add_connection("1", "2")?;
    store.add_connection("1", "3")?;
    Ok(())
}

/// Read `path` and replay it into `store`.
fn load_into(store: &mut GraphStore, path: &Path) -> anyhow::Result<LoadReport> {
    let doc = read_document(path)?;
    let report = store.load_document(&doc);
    if !report.is_clean() {
        tracing::warn!(
            "{}: {} nodes and {} links were rejected",
            path.display(),
            report.nodes_rejected,
            report.links_rejected
        );
    }
    Ok(report)
}

pub async fn serve(
    config: ServerConfig,
    document: Option<PathBuf>,
    demo: bool,
) -> anyhow::Result<()> {
    tracing::info!("Starting mindmap server on {}", config.address());

    let mut store = GraphStore::new();
    match document {
        Some(path) => {
            load_into(&mut store, &path)?;
        }
        None if demo => seed_demo(&mut store)?,
        None => {}
    }

    tracing::info!(
        "Graph ready: {} nodes, {} links",
        store.node_count(),
        store.connection_count()
    );

    MindMapServer::new(store, config).start().await
}

/// Load a document into a fresh store and print what was accepted.
pub fn check(path: PathBuf) -> anyhow::Result<()> {
    let mut store = GraphStore::new();
    let report = load_into(&mut store, &path)?;

    println!(
        "{}: {} nodes, {} links accepted; {} nodes, {} links rejected",
        path.display(),
        report.nodes_added,
        report.links_added,
        report.nodes_rejected,
        report.links_rejected
    );

    if report.is_clean() {
        Ok(())
    } else {
        anyhow::bail!("{} contains entries the graph rejects", path.display())
    }
}

/// Load a document and save what the store kept, dropping rejected entries.
pub fn normalize(path: PathBuf, out: Option<PathBuf>) -> anyhow::Result<()> {
    let mut store = GraphStore::new();
    load_into(&mut store, &path)?;

    let out = out.unwrap_or_else(|| path.clone());
    write_document(&store.full_graph(), &out)
        .with_context(|| format!("failed to save {}", out.display()))?;

    tracing::info!(
        "Saved {} nodes, {} links to {}",
        store.node_count(),
        store.connection_count(),
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::Connection;

    #[test]
    fn test_seed_demo() {
        let mut store = GraphStore::new();
        seed_demo(&mut store).unwrap();
        let graph = store.full_graph();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(
            graph.links,
            vec![Connection::new("1", "2"), Connection::new("1", "3")]
        );
        // Seeding twice collides on the root id.
        assert!(seed_demo(&mut store).is_err());
    }

    #[test]
    fn test_normalize_drops_rejected_entries() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.mmap");
        let output = dir.path().join("out.mmap");
        std::fs::write(
            &input,
            r#"{"nodes":[{"id":"1","text":"Root"},{"id":"1","text":"Dup"}],
                "links":[{"source":"1","target":"1"},{"source":"1","target":"2"}]}"#,
        )
        .unwrap();

        normalize(input.clone(), Some(output.clone())).unwrap();
        assert!(check(input).is_err());
        check(output.clone()).unwrap();

        let doc = read_document(&output).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.links, vec![Connection::new("1", "1")]);
    }
}
