//! Mindmap Core — graph store, change events, and document format

mod graph;

pub mod document;
pub mod error;
pub mod event;
pub mod model;
pub mod store;


pub use document::{
    DOCUMENT_EXTENSION, parse_document, read_document, render_document, write_document,
};
pub use error::{DocumentError, GraphError, Missing};
pub use event::{GraphEvent, Listener, SubscriptionId};
pub use model::{Connection, GraphSnapshot, Node};
pub use store::{GraphStore, LoadReport};
