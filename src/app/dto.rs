use crate::domain::call_tree::{CallTree, CallTreeNode};
use crate::domain::cycles::Cycle;
use crate::domain::node::{CallEdge, EntryPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Facts,
    Snapshot,
    Prebuilt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub source: String,
    pub source_kind: SourceKind,
    pub node_count: usize,
    pub edge_count: usize,
    pub entry_point_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPointsResponse {
    pub count: usize,
    pub entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRequest {
    pub signature: String,
    /// Falls back to the configured depth.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeResponse {
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPoint>,
    pub max_depth: usize,
    pub node_count: usize,
    pub depth: usize,
    pub tree: CallTreeNode,
    pub rendered: String,
}

impl TreeResponse {
    pub fn from_tree(tree: CallTree, max_depth: usize) -> Self {
        Self {
            signature: tree.root.signature.clone(),
            entry_point: tree.root.entry_point.clone(),
            max_depth,
            node_count: tree.root.size(),
            depth: tree.root.depth(),
            tree: tree.root,
            rendered: tree.rendered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreesResponse {
    pub max_depth: usize,
    pub trees: Vec<TreeResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyclesResponse {
    pub count: usize,
    pub cycles: Vec<Cycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsResponse {
    pub count: usize,
    pub relations: Vec<CallEdge>,
}
