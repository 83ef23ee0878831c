use crate::domain::node::{CallEdge, GraphNode, Layer, MethodSignature};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Call graph - directed, simple graph keyed by method signature
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// The directed graph of nodes and call edges
    pub graph: DiGraph<GraphNode, ()>,

    /// Mapping from signature to node index
    pub signature_to_node: HashMap<MethodSignature, NodeIndex>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. First write wins: re-adding an existing signature keeps the original
    /// metadata and returns the existing index.
    pub fn add_node(
        &mut self,
        signature: &str,
        class_name: &str,
        file_path: &str,
        layer: Layer,
    ) -> NodeIndex {
        self.insert_node(GraphNode::new(signature, class_name, file_path, layer))
    }

    pub fn insert_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.signature_to_node.get(&node.signature) {
            return idx;
        }
        let signature = node.signature.clone();
        let idx = self.graph.add_node(node);
        self.signature_to_node.insert(signature, idx);
        idx
    }

    /// Link `caller → callee`, creating either endpoint with Unknown metadata if missing.
    /// Returns `false` when the edge already existed.
    pub fn add_edge(&mut self, caller: &str, callee: &str) -> bool {
        let source = self.ensure_node(caller);
        let target = self.ensure_node(callee);
        if self.graph.find_edge(source, target).is_some() {
            return false;
        }
        self.graph.add_edge(source, target, ());
        true
    }

    fn ensure_node(&mut self, signature: &str) -> NodeIndex {
        match self.signature_to_node.get(signature) {
            Some(&idx) => idx,
            None => self.insert_node(GraphNode::unknown(signature)),
        }
    }

    pub fn get_node_by_signature(&self, signature: &str) -> Option<NodeIndex> {
        self.signature_to_node.get(signature).copied()
    }

    pub fn node(&self, signature: &str) -> Option<&GraphNode> {
        self.get_node_by_signature(signature)
            .map(|idx| &self.graph[idx])
    }

    /// Metadata is only adjusted by the builder before the graph is handed out.
    pub(crate) fn node_mut(&mut self, signature: &str) -> Option<&mut GraphNode> {
        let idx = self.get_node_by_signature(signature)?;
        self.graph.node_weight_mut(idx)
    }

    pub fn has_node(&self, signature: &str) -> bool {
        self.signature_to_node.contains_key(signature)
    }

    pub fn has_edge(&self, caller: &str, callee: &str) -> bool {
        match (
            self.get_node_by_signature(caller),
            self.get_node_by_signature(callee),
        ) {
            (Some(source), Some(target)) => self.graph.find_edge(source, target).is_some(),
            _ => false,
        }
    }

    /// Direct callees, sorted by signature for deterministic traversal.
    pub fn successors(&self, signature: &str) -> Vec<&str> {
        self.neighbors(signature, Direction::Outgoing)
    }

    /// Direct callers, sorted by signature.
    pub fn predecessors(&self, signature: &str) -> Vec<&str> {
        self.neighbors(signature, Direction::Incoming)
    }

    fn neighbors(&self, signature: &str, direction: Direction) -> Vec<&str> {
        let Some(idx) = self.get_node_by_signature(signature) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].signature.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn signatures(&self) -> impl Iterator<Item = &MethodSignature> {
        self.signature_to_node.keys()
    }

    /// Flat edge list, sorted by (caller, callee).
    pub fn edges(&self) -> Vec<CallEdge> {
        let mut edges: Vec<CallEdge> = self
            .graph
            .edge_references()
            .map(|e| {
                CallEdge::new(
                    self.graph[e.source()].signature.clone(),
                    self.graph[e.target()].signature.clone(),
                )
            })
            .collect();
        edges.sort();
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::UNKNOWN;

    #[test]
    fn add_node_is_idempotent_and_first_write_wins() {
        let mut graph = CallGraph::new();
        let a = graph.add_node("A.m", "A", "A.java", Layer::service());
        let again = graph.add_node("A.m", "Other", "Other.java", Layer::controller());
        assert_eq!(a, again);
        assert_eq!(graph.node_count(), 1);
        let node = graph.node("A.m").unwrap();
        assert_eq!(node.class_name, "A");
        assert_eq!(node.layer, Layer::service());
    }

    #[test]
    fn add_edge_creates_unknown_endpoints() {
        let mut graph = CallGraph::new();
        graph.add_node("A.m", "A", "A.java", Layer::service());
        assert!(graph.add_edge("A.m", "svc.find"));
        assert!(graph.has_node("svc.find"));
        let callee = graph.node("svc.find").unwrap();
        assert_eq!(callee.class_name, UNKNOWN);
        assert!(callee.layer.is_unknown());
        assert!(graph.has_edge("A.m", "svc.find"));
        assert!(!graph.has_edge("svc.find", "A.m"));
    }

    #[test]
    fn graph_is_simple() {
        let mut graph = CallGraph::new();
        assert!(graph.add_edge("A.m", "B.n"));
        assert!(!graph.add_edge("A.m", "B.n"));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn neighbors_are_sorted() {
        let mut graph = CallGraph::new();
        graph.add_edge("A.m", "C.z");
        graph.add_edge("A.m", "B.y");
        graph.add_edge("D.q", "B.y");
        assert_eq!(graph.successors("A.m"), vec!["B.y", "C.z"]);
        assert_eq!(graph.predecessors("B.y"), vec!["A.m", "D.q"]);
        assert!(graph.successors("Missing.x").is_empty());
    }

    #[test]
    fn edges_have_no_dangling_endpoints() {
        let mut graph = CallGraph::new();
        graph.add_edge("A.m", "B.n");
        graph.add_edge("B.n", "A.m");
        graph.add_edge("B.n", "B.n");
        for edge in graph.edges() {
            assert!(graph.has_node(&edge.caller));
            assert!(graph.has_node(&edge.callee));
        }
        assert_eq!(graph.edges().len(), 3);
    }
}
