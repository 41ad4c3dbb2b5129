//! Core data structures for the mind map graph

use serde::{Deserialize, Serialize};

/// A labeled vertex in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Stable external identity, unique among live nodes.
    pub id: String,
    pub text: String,
    /// Advisory parent id. Never enforced; may name a node that does not exist.
    #[serde(rename = "parent", default)]
    pub parent_id: String,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Node {
            id: id.into(),
            text: text.into(),
            parent_id: parent_id.into(),
        }
    }

    /// True if this node carries no parent reference.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }
}

/// A directed edge, identified by its ordered endpoint pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Connection {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Immutable view of the whole graph at one point in time.
///
/// This is also the save/load document shape:
/// `{ "nodes": [{ "id", "text", "parent" }], "links": [{ "source", "target" }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Connection>,
}
