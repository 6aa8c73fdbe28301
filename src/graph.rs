//! Dependency Graph - in-memory record graph for one import call
//!
//! Built fresh per import, used by the pipeline stages, discarded when the
//! call returns. Nodes live in an arena keyed by `RecordRef`; edges refer to
//! nodes by key, never by pointer, so cyclic structures need no special
//! handling.

use crate::edge::{Edge, EdgeKind};
use crate::record::RecordRef;
use std::collections::HashMap;

/// A resolved record in the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// The record this node stands for
    pub rec: RecordRef,
    /// Owner recorded when the node was discovered through an Owns edge
    pub owner: Option<RecordRef>,
    /// Owns-edge distance from the nearest root (roots are depth 0)
    pub depth: usize,
    /// Set by the deduplicator when an equivalent record exists in the target
    pub exists_in_target: bool,
}

impl GraphNode {
    /// Create a node for a freshly discovered record
    pub fn new(rec: RecordRef, owner: Option<RecordRef>, depth: usize) -> Self {
        Self {
            rec,
            owner,
            depth,
            exists_in_target: false,
        }
    }
}

/// In-memory dependency graph over records.
///
/// A directed multigraph with two edge kinds (owns, references). Edges may
/// point at records without a node when the owned-depth limit truncated
/// traversal; such targets are declared-but-unresolved leaves.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// All nodes indexed by record reference
    nodes: HashMap<RecordRef, GraphNode>,
    /// Edges from a record (outgoing)
    edges_from: HashMap<RecordRef, Vec<Edge>>,
    /// Edges to a record (incoming)
    edges_to: HashMap<RecordRef, Vec<Edge>>,
    /// Node insertion order; planning uses it for deterministic tie-breaks
    order: Vec<RecordRef>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    ///
    /// A record can only gain one node; a second add for the same ref is
    /// ignored (the node keeps its first owner and depth).
    pub fn add_node(&mut self, node: GraphNode) {
        if self.nodes.contains_key(&node.rec) {
            return;
        }
        self.order.push(node.rec);
        self.nodes.insert(node.rec, node);
    }

    /// Add an edge to the graph.
    ///
    /// An Owns edge also records the owner on the owned node when the node is
    /// already present and unowned.
    pub fn add_edge(&mut self, edge: Edge) {
        if edge.kind == EdgeKind::Owns {
            if let Some(node) = self.nodes.get_mut(&edge.to) {
                if node.owner.is_none() {
                    node.owner = Some(edge.from);
                }
            }
        }
        self.edges_from.entry(edge.from).or_default().push(edge);
        self.edges_to.entry(edge.to).or_default().push(edge);
    }

    /// Remove one occurrence of an edge from both adjacency maps.
    ///
    /// Used by the cycle detector to sever a weakest edge in place.
    pub fn remove_edge(&mut self, edge: &Edge) {
        if let Some(edges) = self.edges_from.get_mut(&edge.from) {
            if let Some(pos) = edges.iter().position(|e| e == edge) {
                edges.remove(pos);
            }
        }
        if let Some(edges) = self.edges_to.get_mut(&edge.to) {
            if let Some(pos) = edges.iter().position(|e| e == edge) {
                edges.remove(pos);
            }
        }
    }

    /// Check whether a record has a node
    pub fn contains(&self, rec: &RecordRef) -> bool {
        self.nodes.contains_key(rec)
    }

    /// Get a node by record reference
    pub fn get(&self, rec: &RecordRef) -> Option<&GraphNode> {
        self.nodes.get(rec)
    }

    /// Mark a node as already existing in the target store
    pub fn mark_existing(&mut self, rec: &RecordRef) {
        if let Some(node) = self.nodes.get_mut(rec) {
            node.exists_in_target = true;
        }
    }

    /// Get outgoing edges from a record
    pub fn edges_from(&self, rec: &RecordRef) -> &[Edge] {
        self.edges_from.get(rec).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get incoming edges to a record
    pub fn edges_to(&self, rec: &RecordRef) -> &[Edge] {
        self.edges_to.get(rec).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get outgoing edges of a specific kind
    pub fn edges_from_by_kind(&self, rec: &RecordRef, kind: EdgeKind) -> Vec<&Edge> {
        self.edges_from(rec)
            .iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    /// Record references in insertion order
    pub fn refs_in_order(&self) -> &[RecordRef] {
        &self.order
    }

    /// Nodes in insertion order
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter().filter_map(|rec| self.nodes.get(rec))
    }

    /// Get all edges
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges_from.values().flat_map(|v| v.iter())
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let owns_edges = self
            .edges_from
            .values()
            .flat_map(|v| v.iter())
            .filter(|e| e.kind == EdgeKind::Owns)
            .count();
        let total_edges: usize = self.edges_from.values().map(|v| v.len()).sum();

        GraphStats {
            records: self.nodes.len(),
            owns_edges,
            reference_edges: total_edges - owns_edges,
            max_depth: self.nodes.values().map(|n| n.depth).max().unwrap_or(0),
        }
    }
}

/// Statistics about a dependency graph
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub records: usize,
    pub owns_edges: usize,
    pub reference_edges: usize,
    pub max_depth: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dependency Graph Statistics:")?;
        writeln!(f, "  Records: {}", self.records)?;
        writeln!(
            f,
            "  Edges: {} (owns: {}, references: {})",
            self.owns_edges + self.reference_edges,
            self.owns_edges,
            self.reference_edges
        )?;
        writeln!(f, "  Max owned depth: {}", self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;

    fn sample(kind: RecordKind) -> RecordRef {
        RecordRef::random(kind)
    }

    #[test]
    fn test_add_and_retrieve_node() {
        let mut graph = DependencyGraph::new();
        let entry = sample(RecordKind::Entry);

        graph.add_node(GraphNode::new(entry, None, 0));

        let node = graph.get(&entry).unwrap();
        assert_eq!(node.rec, entry);
        assert_eq!(node.depth, 0);
        assert!(!node.exists_in_target);
    }

    #[test]
    fn test_duplicate_node_ignored() {
        let mut graph = DependencyGraph::new();
        let entry = sample(RecordKind::Entry);
        let other = sample(RecordKind::Entry);

        graph.add_node(GraphNode::new(entry, None, 0));
        graph.add_node(GraphNode::new(entry, Some(other), 3));

        assert_eq!(graph.len(), 1);
        let node = graph.get(&entry).unwrap();
        assert_eq!(node.depth, 0);
        assert!(node.owner.is_none());
    }

    #[test]
    fn test_owns_edge_records_owner() {
        let mut graph = DependencyGraph::new();
        let entry = sample(RecordKind::Entry);
        let sense = sample(RecordKind::Sense);

        graph.add_node(GraphNode::new(entry, None, 0));
        graph.add_node(GraphNode::new(sense, None, 1));
        graph.add_edge(Edge::owns(entry, sense));

        assert_eq!(graph.get(&sense).unwrap().owner, Some(entry));
    }

    #[test]
    fn test_edges_both_directions() {
        let mut graph = DependencyGraph::new();
        let sense = sample(RecordKind::Sense);
        let pos = sample(RecordKind::PartOfSpeech);

        graph.add_node(GraphNode::new(sense, None, 0));
        graph.add_node(GraphNode::new(pos, None, 0));
        graph.add_edge(Edge::references(sense, pos));

        assert_eq!(graph.edges_from(&sense).len(), 1);
        assert_eq!(graph.edges_to(&pos).len(), 1);
        assert_eq!(graph.edges_from_by_kind(&sense, EdgeKind::References).len(), 1);
        assert!(graph.edges_from_by_kind(&sense, EdgeKind::Owns).is_empty());
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = DependencyGraph::new();
        let sense = sample(RecordKind::Sense);
        let pos = sample(RecordKind::PartOfSpeech);

        graph.add_node(GraphNode::new(sense, None, 0));
        graph.add_node(GraphNode::new(pos, None, 0));
        let edge = Edge::references(sense, pos);
        graph.add_edge(edge);
        graph.remove_edge(&edge);

        assert!(graph.edges_from(&sense).is_empty());
        assert!(graph.edges_to(&pos).is_empty());
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let mut graph = DependencyGraph::new();
        let a = sample(RecordKind::Entry);
        let b = sample(RecordKind::Sense);
        let c = sample(RecordKind::PartOfSpeech);

        graph.add_node(GraphNode::new(a, None, 0));
        graph.add_node(GraphNode::new(b, None, 1));
        graph.add_node(GraphNode::new(c, None, 1));

        assert_eq!(graph.refs_in_order(), &[a, b, c]);
    }

    #[test]
    fn test_stats() {
        let mut graph = DependencyGraph::new();
        let entry = sample(RecordKind::Entry);
        let sense = sample(RecordKind::Sense);
        let pos = sample(RecordKind::PartOfSpeech);

        graph.add_node(GraphNode::new(entry, None, 0));
        graph.add_node(GraphNode::new(sense, Some(entry), 1));
        graph.add_node(GraphNode::new(pos, None, 1));
        graph.add_edge(Edge::owns(entry, sense));
        graph.add_edge(Edge::references(sense, pos));

        let stats = graph.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.owns_edges, 1);
        assert_eq!(stats.reference_edges, 1);
        assert_eq!(stats.max_depth, 1);
    }
}
