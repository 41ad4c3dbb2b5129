//! Change events emitted by the store

use serde::{Deserialize, Serialize};

use crate::model::{Connection, GraphSnapshot, Node};

/// One change to the graph, broadcast to every subscribed listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEvent {
    NodeAdded { node: Node },
    NodeRemoved { id: String },
    /// Carries the full node after the update.
    NodeUpdated { node: Node },
    ConnectionAdded { link: Connection },
    ConnectionRemoved { source: String, target: String },
    /// Full snapshot, only sent in answer to a view's ready signal.
    GraphUpdated { graph: GraphSnapshot },
}

impl GraphEvent {
    /// Wire name of the variant, matching the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::NodeAdded { .. } => "node_added",
            GraphEvent::NodeRemoved { .. } => "node_removed",
            GraphEvent::NodeUpdated { .. } => "node_updated",
            GraphEvent::ConnectionAdded { .. } => "connection_added",
            GraphEvent::ConnectionRemoved { .. } => "connection_removed",
            GraphEvent::GraphUpdated { .. } => "graph_updated",
        }
    }
}

/// Handle returned by `GraphStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Callback invoked synchronously for every emitted event.
pub type Listener = Box<dyn FnMut(&GraphEvent) + Send>;

/// Ordered subscription list. Listeners run in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn emit(&mut self, event: &GraphEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }
}
