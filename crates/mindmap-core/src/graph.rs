//! Graph storage using petgraph::StableDiGraph keyed by external string ids

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::model::{Connection, Node};

/// Node weight plus its insertion rank. StableDiGraph reuses freed slots, so
/// index order alone does not reflect insertion order.
#[derive(Debug, Clone)]
struct NodeSlot {
    order: u64,
    node: Node,
}

#[derive(Debug, Clone)]
struct LinkSlot {
    order: u64,
    link: Connection,
}

/// Raw storage. Performs no validation beyond what is needed to keep the id
/// index consistent; the store enforces the graph invariants on top of it.
pub(crate) struct Graph {
    inner: StableDiGraph<NodeSlot, LinkSlot>,
    index: HashMap<String, NodeIndex>,
    next_order: u64,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub(crate) fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            next_order: 0,
        }
    }

    fn bump_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub(crate) fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub(crate) fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn node(&self, id: &str) -> Option<&Node> {
        let idx = *self.index.get(id)?;
        self.inner.node_weight(idx).map(|slot| &slot.node)
    }

    /// Insert a node. Returns false without touching the graph if the id is taken.
    pub(crate) fn insert_node(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let order = self.bump_order();
        let id = node.id.clone();
        let idx = self.inner.add_node(NodeSlot { order, node });
        self.index.insert(id, idx);
        true
    }

    /// Replace a node's text in place. Returns the updated node.
    pub(crate) fn set_text(&mut self, id: &str, text: String) -> Option<&Node> {
        let idx = *self.index.get(id)?;
        let slot = self.inner.node_weight_mut(idx)?;
        slot.node.text = text;
        Some(&slot.node)
    }

    /// Remove a node. Any edges still attached are dropped by petgraph.
    pub(crate) fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.index.remove(id)?;
        self.inner.remove_node(idx).map(|slot| slot.node)
    }

    fn find_edge(&self, source: &str, target: &str) -> Option<EdgeIndex> {
        let a = *self.index.get(source)?;
        let b = *self.index.get(target)?;
        self.inner.find_edge(a, b)
    }

    pub(crate) fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.find_edge(source, target).is_some()
    }

    /// Insert an edge. Returns false without touching the graph if the ordered
    /// pair already exists or either endpoint is missing.
    pub(crate) fn insert_edge(&mut self, link: Connection) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(&link.source), self.index.get(&link.target))
        else {
            return false;
        };
        if self.inner.find_edge(a, b).is_some() {
            return false;
        }
        let order = self.bump_order();
        self.inner.add_edge(a, b, LinkSlot { order, link });
        true
    }

    pub(crate) fn remove_edge(&mut self, source: &str, target: &str) -> Option<Connection> {
        let idx = self.find_edge(source, target)?;
        self.inner.remove_edge(idx).map(|slot| slot.link)
    }

    /// Every edge with `id` as source or target, in insertion order. A
    /// self-connection appears once.
    pub(crate) fn incident_edges(&self, id: &str) -> Vec<Connection> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut found: Vec<(EdgeIndex, &LinkSlot)> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.inner.edges_directed(idx, Direction::Incoming))
            .map(|edge_ref| (edge_ref.id(), edge_ref.weight()))
            .collect();
        found.sort_by_key(|(_, slot)| slot.order);
        found.dedup_by_key(|(edge_idx, _)| *edge_idx);
        found.into_iter().map(|(_, slot)| slot.link.clone()).collect()
    }

    /// All nodes in insertion order.
    pub(crate) fn nodes(&self) -> Vec<&Node> {
        let mut slots: Vec<&NodeSlot> = self
            .inner
            .node_indices()
            .filter_map(|idx| self.inner.node_weight(idx))
            .collect();
        slots.sort_by_key(|slot| slot.order);
        slots.into_iter().map(|slot| &slot.node).collect()
    }

    /// All edges in insertion order.
    pub(crate) fn edges(&self) -> Vec<&Connection> {
        let mut slots: Vec<&LinkSlot> = self
            .inner
            .edge_indices()
            .filter_map(|idx| self.inner.edge_weight(idx))
            .collect();
        slots.sort_by_key(|slot| slot.order);
        slots.into_iter().map(|slot| &slot.link).collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
