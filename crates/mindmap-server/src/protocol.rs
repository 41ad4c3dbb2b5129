//! Wire messages exchanged with views over the WebSocket

use mindmap_core::{GraphError, GraphEvent, GraphStore};
use serde::{Deserialize, Serialize};

/// A store event stamped with its position in the event stream.
///
/// Serializes flat: `{ "sequence": 3, "type": "node_added", "node": {...} }`.
/// A view that sees a gap in `sequence` should send `view_ready` to re-sync.
#[derive(Debug, Serialize)]
pub struct EventEnvelope<'a> {
    pub sequence: u64,
    #[serde(flatten)]
    pub event: &'a GraphEvent,
}

/// Messages a view sends to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The view has attached its listeners and wants the full graph.
    ViewReady,
    AddNode {
        id: String,
        text: String,
        #[serde(rename = "parent", default)]
        parent_id: String,
    },
    RemoveNode {
        id: String,
    },
    UpdateNodeText {
        id: String,
        text: String,
    },
    AddConnection {
        source: String,
        target: String,
    },
    RemoveConnection {
        source: String,
        target: String,
    },
    Ping,
}

/// Direct replies to a single view. Graph changes go out as envelopes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Pong,
    /// A command was rejected by the store.
    Error { message: String },
}

impl From<GraphError> for ServerMessage {
    fn from(err: GraphError) -> Self {
        ServerMessage::Error {
            message: err.to_string(),
        }
    }
}

/// Apply one client message to the store. Returns the reply owed to the
/// sender, if any; resulting events reach every view through the store's
/// listeners.
pub fn apply(store: &mut GraphStore, msg: ClientMessage) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::ViewReady => {
            store.on_view_ready();
            Ok(())
        }
        ClientMessage::AddNode { id, text, parent_id } => store.add_node(id, text, parent_id),
        ClientMessage::RemoveNode { id } => store.remove_node(&id),
        ClientMessage::UpdateNodeText { id, text } => store.update_node_text(&id, text),
        ClientMessage::AddConnection { source, target } => store.add_connection(&source, &target),
        ClientMessage::RemoveConnection { source, target } => {
            store.remove_connection(&source, &target)
        }
        ClientMessage::Ping => return Some(ServerMessage::Pong),
    };
    result.err().map(ServerMessage::from)
}
