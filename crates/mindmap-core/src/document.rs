//! Save/load of graph documents as JSON files

use std::path::Path;

use crate::error::DocumentError;
use crate::model::GraphSnapshot;

/// Default extension for saved mind maps.
pub const DOCUMENT_EXTENSION: &str = "mmap";

/// Parse a document from a JSON string.
pub fn parse_document(json: &str) -> Result<GraphSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

/// Render a document as pretty-printed JSON.
pub fn render_document(doc: &GraphSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Read a document from disk.
pub fn read_document(path: &Path) -> Result<GraphSnapshot, DocumentError> {
    let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_document(&json).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        "Document loaded from {}: {} nodes, {} links",
        path.display(),
        doc.nodes.len(),
        doc.links.len()
    );
    Ok(doc)
}

/// Write a document to disk, creating parent directories as needed.
pub fn write_document(doc: &GraphSnapshot, path: &Path) -> Result<(), DocumentError> {
    let io_err = |source: std::io::Error| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = render_document(doc).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)?;
    tracing::debug!("Document saved: {}", path.display());
    Ok(())
}
