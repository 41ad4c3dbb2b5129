//! Rejection and document errors

use std::path::PathBuf;

use thiserror::Error;

/// Why a store mutation was rejected. None of these are fatal: a rejected call
/// leaves the graph untouched and emits no event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `add_node` with an id that is already live.
    #[error("node with id {0:?} already exists")]
    DuplicateId(String),

    /// `add_connection` naming an endpoint that is not live.
    #[error("cannot connect {source_id:?} -> {target_id:?}: node {missing:?} does not exist")]
    UnknownNode {
        source_id: String,
        target_id: String,
        missing: String,
    },

    /// `add_connection` for an ordered pair that is already present.
    #[error("connection {source_id:?} -> {target_id:?} already exists")]
    DuplicateConnection { source_id: String, target_id: String },

    /// Remove/update on an entity that is not live.
    #[error("{0} not found")]
    NotFound(Missing),
}

/// The entity a `NotFound` rejection refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Node(String),
    Connection { source: String, target: String },
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Node(id) => write!(f, "node {:?}", id),
            Missing::Connection { source, target } => {
                write!(f, "connection {:?} -> {:?}", source, target)
            }
        }
    }
}

/// Failure reading or writing a document file.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
