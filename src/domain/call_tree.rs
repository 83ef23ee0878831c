//! Cycle-safe call tree materialization.
//!
//! Traversal is an iterative depth-first walk over an explicit work stack. A callee that is
//! already on the current path becomes a childless `circular` leaf; this on-path check alone
//! guarantees termination. Callees deeper than `max_depth` are omitted entirely, so an absent
//! branch at the depth boundary means "truncated", not "no callees".

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::{GraphError, SnapshotError};
use crate::domain::graph::CallGraph;
use crate::domain::node::{EntryPoint, Layer, MethodSignature};

/// One node of a materialized call tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub signature: MethodSignature,
    #[serde(default)]
    pub layer: Layer,
    #[serde(default, skip_serializing_if = "is_false")]
    pub circular: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CallTreeNode>,
    /// Only set on roots traced from an entry point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPoint>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CallTreeNode {
    pub fn new(signature: impl Into<MethodSignature>, layer: Layer) -> Self {
        Self {
            signature: signature.into(),
            layer,
            circular: false,
            children: Vec::new(),
            entry_point: None,
        }
    }

    pub fn circular(signature: impl Into<MethodSignature>, layer: Layer) -> Self {
        Self {
            circular: true,
            ..Self::new(signature, layer)
        }
    }

    pub fn child_signatures(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.signature.as_str()).collect()
    }

    /// Depth-first search for the first node with `signature`.
    pub fn find(&self, signature: &str) -> Option<&CallTreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.signature == signature {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Longest root-to-leaf distance in edges.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

/// Structured tree and its text rendering, produced by one traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallTree {
    pub root: CallTreeNode,
    pub rendered: String,
}

struct Frame<'g> {
    node: CallTreeNode,
    depth: usize,
    /// Remaining callees, reversed so `pop` yields them in signature order.
    pending: Vec<&'g str>,
}

/// Call tree engine bound to a finished, immutable graph.
#[derive(Debug, Clone)]
pub struct CallTreeEngine {
    graph: Arc<CallGraph>,
}

impl CallTreeEngine {
    pub fn new(graph: Arc<CallGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    /// Materialize the call tree below `root`.
    pub fn build_tree(&self, root: &str, max_depth: usize) -> Result<CallTreeNode, GraphError> {
        if !self.graph.has_node(root) {
            return Err(GraphError::UnknownSignature(root.to_string()));
        }

        // Only the current root-to-node path is tracked; a callee reached again on another
        // branch is expanded again.
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut stack: Vec<Frame<'_>> = vec![self.frame(root, 0, max_depth)];
        on_path.insert(self.interned(root));

        loop {
            let Some(top) = stack.last_mut() else {
                unreachable!("the root frame is only popped on return");
            };

            if let Some(next) = top.pending.pop() {
                let depth = top.depth + 1;
                if on_path.contains(next) {
                    top.node
                        .children
                        .push(CallTreeNode::circular(next, self.layer_of(next)));
                    continue;
                }
                on_path.insert(next);
                stack.push(self.frame(next, depth, max_depth));
                continue;
            }

            let Some(finished) = stack.pop() else {
                unreachable!("stack was non-empty above");
            };
            on_path.remove(finished.node.signature.as_str());
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(finished.node),
                None => return Ok(finished.node),
            }
        }
    }

    /// Build the tree and its text form in one call. When `entry_point` is given it is
    /// attached to the root and shown in the first rendered line.
    pub fn trace(
        &self,
        root: &str,
        max_depth: usize,
        entry_point: Option<&EntryPoint>,
    ) -> Result<CallTree, GraphError> {
        let mut tree = self.build_tree(root, max_depth)?;
        tree.entry_point = entry_point.cloned();
        let rendered = render_tree(&tree);
        Ok(CallTree {
            root: tree,
            rendered,
        })
    }

    fn frame(&self, signature: &str, depth: usize, max_depth: usize) -> Frame<'_> {
        let pending = if depth < max_depth {
            let mut callees = self.graph.successors(signature);
            callees.reverse();
            callees
        } else {
            Vec::new()
        };
        Frame {
            node: CallTreeNode::new(signature, self.layer_of(signature)),
            depth,
            pending,
        }
    }

    fn layer_of(&self, signature: &str) -> Layer {
        self.graph
            .node(signature)
            .map(|n| n.layer.clone())
            .unwrap_or_default()
    }

    /// Borrow the graph-owned copy of a signature so state keys outlive frames.
    fn interned<'g>(&'g self, signature: &str) -> &'g str {
        self.graph
            .node(signature)
            .map(|n| n.signature.as_str())
            .unwrap_or_default()
    }

    /// Rebuild a graph purely from the parent → child links of serialized trees.
    pub fn restore_from_snapshot(
        trees: &[CallTreeNode],
        entry_points: &[EntryPoint],
    ) -> Result<CallGraph, SnapshotError> {
        let mut graph = CallGraph::new();
        Self::restore_into(&mut graph, trees, entry_points)?;
        Ok(graph)
    }

    /// Like [`Self::restore_from_snapshot`], into a graph that may already carry node
    /// metadata (first write wins).
    pub fn restore_into(
        graph: &mut CallGraph,
        trees: &[CallTreeNode],
        entry_points: &[EntryPoint],
    ) -> Result<(), SnapshotError> {
        for entry in entry_points {
            if entry.signature.trim().is_empty() {
                return Err(SnapshotError::EmptySignature {
                    parent: format!("entry point {}", entry.descriptor()),
                });
            }
            graph.add_node(
                &entry.signature,
                &entry.class_name,
                &entry.file_path,
                Layer::unknown(),
            );
        }

        for tree in trees {
            if tree.signature.trim().is_empty() {
                return Err(SnapshotError::EmptySignature {
                    parent: "<root>".to_string(),
                });
            }
            if let Some(entry) = &tree.entry_point
                && entry.signature != tree.signature
            {
                return Err(SnapshotError::RootMismatch {
                    signature: tree.signature.clone(),
                    entry_point: entry.signature.clone(),
                });
            }

            let mut stack = vec![tree];
            while let Some(node) = stack.pop() {
                if node.circular && !node.children.is_empty() {
                    return Err(SnapshotError::CircularWithChildren(node.signature.clone()));
                }
                restore_node(graph, node);
                for child in &node.children {
                    if child.signature.trim().is_empty() {
                        return Err(SnapshotError::EmptySignature {
                            parent: node.signature.clone(),
                        });
                    }
                    restore_node(graph, child);
                    graph.add_edge(&node.signature, &child.signature);
                    stack.push(child);
                }
            }
        }
        Ok(())
    }
}

fn restore_node(graph: &mut CallGraph, node: &CallTreeNode) {
    if !graph.has_node(&node.signature) {
        let class_name = node
            .signature
            .rsplit_once('.')
            .map(|(class, _)| class)
            .unwrap_or(crate::domain::node::UNKNOWN);
        graph.add_node(
            &node.signature,
            class_name,
            crate::domain::node::UNKNOWN,
            node.layer.clone(),
        );
    } else if let Some(existing) = graph.node_mut(&node.signature)
        && existing.layer.is_unknown()
    {
        existing.layer = node.layer.clone();
    }
}

/// Indented ASCII rendering of a call tree.
///
/// ```text
/// [GET /users] UserController.list [Controller]
/// ├── UserService.list [Service]
/// │   └── UserRepository.findAll [Repository]
/// └── UserController.list [Controller] (circular)
/// ```
pub fn render_tree(root: &CallTreeNode) -> String {
    let mut out = String::new();
    if let Some(entry) = &root.entry_point {
        let _ = write!(out, "[{}] ", entry.descriptor());
    }
    let _ = writeln!(out, "{}", node_label(root));

    // (node, prefix for its own line, prefix for its children)
    let mut stack: Vec<(&CallTreeNode, String, String)> = Vec::new();
    push_children(&mut stack, root, "");
    while let Some((node, line_prefix, child_prefix)) = stack.pop() {
        let _ = writeln!(out, "{}{}", line_prefix, node_label(node));
        push_children(&mut stack, node, &child_prefix);
    }
    out
}

fn push_children<'t>(
    stack: &mut Vec<(&'t CallTreeNode, String, String)>,
    node: &'t CallTreeNode,
    prefix: &str,
) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate().rev() {
        let last = i + 1 == count;
        let (branch, guide) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        stack.push((
            child,
            format!("{}{}", prefix, branch),
            format!("{}{}", prefix, guide),
        ));
    }
}

fn node_label(node: &CallTreeNode) -> String {
    if node.circular {
        format!("{} [{}] (circular)", node.signature, node.layer)
    } else {
        format!("{} [{}]", node.signature, node.layer)
    }
}
