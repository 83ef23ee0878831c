use std::sync::Arc;

use tracing::warn;

use crate::domain::builder::BuildSummary;
use crate::domain::call_tree::{CallTree, CallTreeEngine};
use crate::domain::cycles::{Cycle, CycleDetector};
use crate::domain::error::GraphError;
use crate::domain::graph::CallGraph;
use crate::domain::node::{CallEdge, EntryPoint, GraphNode};
use crate::domain::snapshot::GraphSnapshot;

/// Deepest tree a caller may request.
pub const MAX_TREE_DEPTH: usize = 256;

/// A finished call graph with its entry points, ready for queries.
///
/// Immutable after construction; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CallGraphAnalysis {
    graph: Arc<CallGraph>,
    entry_points: Vec<EntryPoint>,
    engine: CallTreeEngine,
    pub(crate) summary: BuildSummary,
}

impl CallGraphAnalysis {
    pub fn from_parts(graph: CallGraph, entry_points: Vec<EntryPoint>, summary: BuildSummary) -> Self {
        let graph = Arc::new(graph);
        Self {
            engine: CallTreeEngine::new(graph.clone()),
            graph,
            entry_points,
            summary,
        }
    }

    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    pub fn summary(&self) -> &BuildSummary {
        &self.summary
    }

    pub fn node(&self, signature: &str) -> Option<&GraphNode> {
        self.graph.node(signature)
    }

    /// Entry point whose method is `signature`, if any.
    pub fn entry_point(&self, signature: &str) -> Option<&EntryPoint> {
        self.entry_points.iter().find(|e| e.signature == signature)
    }

    /// Call tree rooted at an entry point.
    pub fn get_call_tree(&self, entry: &EntryPoint, max_depth: usize) -> Result<CallTree, GraphError> {
        check_depth(max_depth)?;
        self.engine.trace(&entry.signature, max_depth, Some(entry))
    }

    /// Call tree rooted at any method. The matching entry point, if one exists, is attached.
    pub fn get_call_tree_for(&self, signature: &str, max_depth: usize) -> Result<CallTree, GraphError> {
        check_depth(max_depth)?;
        self.engine
            .trace(signature, max_depth, self.entry_point(signature))
    }

    /// One tree per entry point, in entry point order. Unknown roots are logged and skipped.
    pub fn get_all_call_trees(&self, max_depth: usize) -> Result<Vec<CallTree>, GraphError> {
        check_depth(max_depth)?;
        let mut trees = Vec::with_capacity(self.entry_points.len());
        for entry in &self.entry_points {
            match self.engine.trace(&entry.signature, max_depth, Some(entry)) {
                Ok(tree) => trees.push(tree),
                Err(err) if err.is_unknown_signature() => {
                    warn!(entry_point = %entry.descriptor(), error = %err, "skipping entry point");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(trees)
    }

    /// Text rendering of the tree below `signature`.
    pub fn print_call_tree(&self, signature: &str, max_depth: usize) -> Result<String, GraphError> {
        Ok(self.get_call_tree_for(signature, max_depth)?.rendered)
    }

    pub fn detect_circular_references(&self) -> Vec<Cycle> {
        CycleDetector::new(&self.graph).detect()
    }

    /// Every caller → callee pair, sorted.
    pub fn get_call_relations(&self) -> Vec<CallEdge> {
        self.graph.edges()
    }

    /// Serialize the trees of all entry points at `max_depth`.
    pub fn save_snapshot(&self, max_depth: usize) -> Result<GraphSnapshot, GraphError> {
        let trees = self
            .get_all_call_trees(max_depth)?
            .into_iter()
            .map(|t| t.root)
            .collect();
        Ok(GraphSnapshot::new(
            max_depth,
            self.entry_points.clone(),
            trees,
            &self.graph,
        ))
    }

    /// Rebuild an analysis from a snapshot without the original facts.
    pub fn restore_from_snapshot(snapshot: &GraphSnapshot) -> Result<Self, GraphError> {
        let graph = snapshot.restore_graph()?;
        let summary = BuildSummary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            entry_points: snapshot.entry_points.len(),
            ..Default::default()
        };
        Ok(Self::from_parts(graph, snapshot.entry_points.clone(), summary))
    }
}

fn check_depth(max_depth: usize) -> Result<(), GraphError> {
    if max_depth > MAX_TREE_DEPTH {
        return Err(GraphError::InvalidParameter(format!(
            "max_depth {} exceeds {}",
            max_depth, MAX_TREE_DEPTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Layer;

    fn analysis() -> CallGraphAnalysis {
        let mut graph = CallGraph::new();
        graph.add_node("Ctl.get", "Ctl", "Ctl.java", Layer::controller());
        graph.add_node("Svc.load", "Svc", "Svc.java", Layer::service());
        graph.add_edge("Ctl.get", "Svc.load");
        graph.add_edge("Svc.load", "Ctl.get");
        let entries = vec![
            EntryPoint::new("GET", "/a", "Ctl", "get", "Ctl.java"),
            EntryPoint::new("GET", "/gone", "Gone", "x", "Gone.java"),
        ];
        CallGraphAnalysis::from_parts(graph, entries, BuildSummary::default())
    }

    #[test]
    fn all_trees_skip_unknown_roots() {
        let trees = analysis().get_all_call_trees(3).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].root.signature, "Ctl.get");
        assert!(trees[0].root.children[0].children[0].circular);
    }

    #[test]
    fn tree_for_entry_signature_carries_entry_point() {
        let tree = analysis().get_call_tree_for("Ctl.get", 2).unwrap();
        assert_eq!(tree.root.entry_point.as_ref().unwrap().path, "/a");
        assert!(tree.rendered.starts_with("[GET /a] Ctl.get"));
    }

    #[test]
    fn depth_above_limit_is_rejected() {
        let err = analysis().get_call_tree_for("Ctl.get", MAX_TREE_DEPTH + 1).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter(_)));
    }

    #[test]
    fn unknown_signature_is_an_error() {
        let err = analysis().print_call_tree("Nope.x", 2).unwrap_err();
        assert!(err.is_unknown_signature());
    }

    #[test]
    fn snapshot_restores_relations() {
        let original = analysis();
        let snapshot = original.save_snapshot(4).unwrap();
        let restored = CallGraphAnalysis::restore_from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.get_call_relations(), original.get_call_relations());
        assert_eq!(restored.detect_circular_references().len(), 1);
        assert_eq!(restored.node("Svc.load").unwrap().layer, Layer::service());
    }
}
