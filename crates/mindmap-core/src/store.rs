//! The authoritative graph store: validates, applies, and announces every mutation

use tracing::{debug, info, warn};

use crate::error::{GraphError, Missing};
use crate::event::{GraphEvent, Listener, Listeners, SubscriptionId};
use crate::graph::Graph;
use crate::model::{Connection, GraphSnapshot, Node};

/// Sole owner and writer of the node/connection state.
///
/// Every mutation runs to completion, including cascade removal and event
/// delivery, before it returns. Listeners are called synchronously in
/// registration order and cannot re-enter the store while it is borrowed
/// mutably.
#[derive(Default)]
pub struct GraphStore {
    graph: Graph,
    listeners: Listeners,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("graph", &self.graph)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Outcome of replaying a document into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    pub nodes_added: usize,
    pub nodes_rejected: usize,
    pub links_added: usize,
    pub links_rejected: usize,
}

impl LoadReport {
    /// True if every entry of the document was accepted.
    pub fn is_clean(&self) -> bool {
        self.nodes_rejected == 0 && self.links_rejected == 0
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for all subsequent events.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent) + Send + 'static,
    {
        let boxed: Listener = Box::new(listener);
        self.listeners.add(boxed)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    fn emit(&mut self, event: GraphEvent) {
        debug!(kind = event.kind(), "emitting graph event");
        self.listeners.emit(&event);
    }

    /// Add a node. A duplicate live id is rejected without mutation or event.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        text: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Result<(), GraphError> {
        let node = Node::new(id, text, parent_id);
        if !self.graph.insert_node(node.clone()) {
            warn!(id = %node.id, "node with this id already exists");
            return Err(GraphError::DuplicateId(node.id));
        }
        self.emit(GraphEvent::NodeAdded { node });
        Ok(())
    }

    /// Remove a node and, first, every connection touching it.
    ///
    /// Emits one `ConnectionRemoved` per incident connection (in connection
    /// insertion order), then a single `NodeRemoved`.
    pub fn remove_node(&mut self, id: &str) -> Result<(), GraphError> {
        if !self.graph.contains_node(id) {
            debug!(id, "remove_node on absent node");
            return Err(GraphError::NotFound(Missing::Node(id.to_string())));
        }

        for link in self.graph.incident_edges(id) {
            if self.graph.remove_edge(&link.source, &link.target).is_some() {
                self.emit(GraphEvent::ConnectionRemoved {
                    source: link.source,
                    target: link.target,
                });
            }
        }

        self.graph.remove_node(id);
        self.emit(GraphEvent::NodeRemoved { id: id.to_string() });
        Ok(())
    }

    /// Replace a node's text. Identity, parent and position are kept.
    pub fn update_node_text(
        &mut self,
        id: &str,
        new_text: impl Into<String>,
    ) -> Result<(), GraphError> {
        let Some(node) = self.graph.set_text(id, new_text.into()) else {
            debug!(id, "update_node_text on absent node");
            return Err(GraphError::NotFound(Missing::Node(id.to_string())));
        };
        let node = node.clone();
        self.emit(GraphEvent::NodeUpdated { node });
        Ok(())
    }

    /// Connect two live nodes. Missing endpoints and repeated pairs are rejected.
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        if let Some(missing) = [source, target]
            .into_iter()
            .find(|id| !self.graph.contains_node(id))
        {
            warn!(source, target, missing, "cannot add connection between non-existing nodes");
            return Err(GraphError::UnknownNode {
                source_id: source.to_string(),
                target_id: target.to_string(),
                missing: missing.to_string(),
            });
        }

        let link = Connection::new(source, target);
        if !self.graph.insert_edge(link.clone()) {
            debug!(source, target, "connection already exists");
            return Err(GraphError::DuplicateConnection {
                source_id: source.to_string(),
                target_id: target.to_string(),
            });
        }
        self.emit(GraphEvent::ConnectionAdded { link });
        Ok(())
    }

    /// Remove one connection by its ordered pair.
    pub fn remove_connection(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        let Some(link) = self.graph.remove_edge(source, target) else {
            debug!(source, target, "remove_connection on absent connection");
            return Err(GraphError::NotFound(Missing::Connection {
                source: source.to_string(),
                target: target.to_string(),
            }));
        };
        self.emit(GraphEvent::ConnectionRemoved {
            source: link.source,
            target: link.target,
        });
        Ok(())
    }

    /// Owned snapshot of every live node and connection, in insertion order.
    pub fn full_graph(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.nodes().into_iter().cloned().collect(),
            links: self.graph.edges().into_iter().cloned().collect(),
        }
    }

    /// Readiness handshake from a view. Sends the current snapshot once per call.
    pub fn on_view_ready(&mut self) {
        info!(
            nodes = self.graph.node_count(),
            links = self.graph.edge_count(),
            "view ready, sending full graph"
        );
        let graph = self.full_graph();
        self.emit(GraphEvent::GraphUpdated { graph });
    }

    /// Remove every node (and so every connection) through `remove_node`,
    /// emitting the same events an explicit removal would.
    pub fn clear(&mut self) {
        let ids: Vec<String> = self.graph.nodes().into_iter().map(|n| n.id.clone()).collect();
        for id in ids {
            // Cascades from earlier removals never remove nodes, so every id is still live.
            let _ = self.remove_node(&id);
        }
    }

    /// Replace the graph with `doc`: clear, add nodes in order, then links in order.
    pub fn load_document(&mut self, doc: &GraphSnapshot) -> LoadReport {
        self.clear();

        let mut report = LoadReport::default();
        for node in &doc.nodes {
            match self.add_node(node.id.clone(), node.text.clone(), node.parent_id.clone()) {
                Ok(()) => report.nodes_added += 1,
                Err(_) => report.nodes_rejected += 1,
            }
        }
        for link in &doc.links {
            match self.add_connection(&link.source, &link.target) {
                Ok(()) => report.links_added += 1,
                Err(_) => report.links_rejected += 1,
            }
        }

        let roots = self.graph.nodes().into_iter().filter(|n| n.is_root()).count();
        info!(?report, roots, "document loaded");
        report
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.graph.contains_node(id)
    }

    pub fn contains_connection(&self, source: &str, target: &str) -> bool {
        self.graph.contains_edge(source, target)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
