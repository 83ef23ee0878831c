//! Persisted call graph snapshot: call trees + entry points + minimal node metadata.
//!
//! A snapshot is enough to answer call-relation queries again without the original facts.
//! Restoring validates the data and is the one construction path that returns an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::call_tree::{CallTreeEngine, CallTreeNode};
use crate::domain::error::SnapshotError;
use crate::domain::graph::CallGraph;
use crate::domain::node::{EntryPoint, GraphNode, Layer, MethodSignature};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Node metadata kept alongside the trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub class_name: String,
    pub file_path: String,
    #[serde(default)]
    pub layer: Layer,
}

impl From<&GraphNode> for NodeMetadata {
    fn from(node: &GraphNode) -> Self {
        Self {
            class_name: node.class_name.clone(),
            file_path: node.file_path.clone(),
            layer: node.layer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: u32,
    /// Depth the trees were materialized with.
    pub max_depth: usize,
    pub entry_points: Vec<EntryPoint>,
    pub trees: Vec<CallTreeNode>,
    /// Metadata for every signature appearing in `trees`.
    #[serde(default)]
    pub nodes: BTreeMap<MethodSignature, NodeMetadata>,
}

impl GraphSnapshot {
    /// Assemble a snapshot, collecting metadata for every node the trees mention.
    pub fn new(
        max_depth: usize,
        entry_points: Vec<EntryPoint>,
        trees: Vec<CallTreeNode>,
        graph: &CallGraph,
    ) -> Self {
        let mut nodes = BTreeMap::new();
        for tree in &trees {
            let mut stack = vec![tree];
            while let Some(node) = stack.pop() {
                if !nodes.contains_key(&node.signature)
                    && let Some(meta) = graph.node(&node.signature)
                {
                    nodes.insert(node.signature.clone(), NodeMetadata::from(meta));
                }
                stack.extend(node.children.iter());
            }
        }
        Self {
            version: SNAPSHOT_VERSION,
            max_depth,
            entry_points,
            trees,
            nodes,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if let Some(signature) = self.nodes.keys().find(|s| s.trim().is_empty()) {
            return Err(SnapshotError::EmptySignature {
                parent: format!("node metadata {:?}", signature),
            });
        }
        Ok(())
    }

    /// Rebuild the call graph: metadata first, then tree links.
    pub fn restore_graph(&self) -> Result<CallGraph, SnapshotError> {
        self.validate()?;
        let mut graph = CallGraph::new();
        for (signature, meta) in &self.nodes {
            graph.add_node(
                signature,
                &meta.class_name,
                &meta.file_path,
                meta.layer.clone(),
            );
        }
        CallTreeEngine::restore_into(&mut graph, &self.trees, &self.entry_points)?;
        Ok(graph)
    }
}
