mod common;

use std::sync::Arc;

use callpath::domain::call_tree::{CallTreeEngine, CallTreeNode};
use callpath::domain::error::SnapshotError;
use callpath::domain::graph::CallGraph;
use callpath::domain::node::{EntryPoint, Layer};
use callpath::domain::snapshot::GraphSnapshot;

fn graph(edges: &[(&str, &str)]) -> CallGraph {
    let mut g = CallGraph::new();
    for (a, b) in edges {
        g.add_edge(a, b);
    }
    g
}

/// Every (parent, child) pair in a tree, circular leaves included.
fn links(tree: &CallTreeNode) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        for child in &node.children {
            out.push((node.signature.clone(), child.signature.clone()));
            stack.push(child);
        }
    }
    out.sort();
    out
}

#[test]
fn test_max_depth_zero_is_bare_root() {
    let engine = CallTreeEngine::new(Arc::new(graph(&[("A.a", "B.b")])));
    let traced = engine.trace("A.a", 0, None).unwrap();
    assert!(traced.root.children.is_empty());
    assert_eq!(traced.rendered, "A.a [Unknown]\n");
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let names: Vec<String> = (0..5000).map(|i| format!("C{i}.m")).collect();
    let mut g = CallGraph::new();
    for pair in names.windows(2) {
        g.add_edge(&pair[0], &pair[1]);
    }
    let engine = CallTreeEngine::new(Arc::new(g));
    let tree = engine.build_tree("C0.m", 256).unwrap();
    assert_eq!(tree.depth(), 256);
    assert_eq!(tree.size(), 257);
}

#[test]
fn test_restore_reproduces_captured_child_sets() {
    let original = graph(&[
        ("Api.get", "Svc.load"),
        ("Api.get", "Svc.audit"),
        ("Svc.load", "Repo.find"),
        ("Repo.find", "Svc.load"),
        ("Svc.audit", "Svc.audit"),
    ]);
    let engine = CallTreeEngine::new(Arc::new(original.clone()));
    let tree = engine.build_tree("Api.get", 10).unwrap();

    let restored = CallTreeEngine::restore_from_snapshot(std::slice::from_ref(&tree), &[]).unwrap();
    let again = CallTreeEngine::new(Arc::new(restored))
        .build_tree("Api.get", 10)
        .unwrap();

    assert_eq!(links(&again), links(&tree));
    assert_eq!(again, tree);
}

#[test]
fn test_restore_uses_signature_qualifier_as_class() {
    let tree = CallTreeNode {
        children: vec![CallTreeNode::new("Svc.load", Layer::service())],
        ..CallTreeNode::new("Api.get", Layer::controller())
    };
    let restored = CallTreeEngine::restore_from_snapshot(&[tree], &[]).unwrap();
    let node = restored.node("Svc.load").unwrap();
    assert_eq!(node.class_name, "Svc");
    assert_eq!(node.layer, Layer::service());
}

#[test]
fn test_restore_rejects_invalid_trees() {
    let circular_with_children = CallTreeNode {
        circular: true,
        children: vec![CallTreeNode::new("B.b", Layer::unknown())],
        ..CallTreeNode::new("A.a", Layer::unknown())
    };
    assert!(matches!(
        CallTreeEngine::restore_from_snapshot(&[circular_with_children], &[]),
        Err(SnapshotError::CircularWithChildren(_))
    ));

    let empty_child = CallTreeNode {
        children: vec![CallTreeNode::new("  ", Layer::unknown())],
        ..CallTreeNode::new("A.a", Layer::unknown())
    };
    assert!(matches!(
        CallTreeEngine::restore_from_snapshot(&[empty_child], &[]),
        Err(SnapshotError::EmptySignature { .. })
    ));

    let bad_entry = EntryPoint {
        signature: String::new(),
        ..EntryPoint::new("GET", "/", "A", "a", "")
    };
    assert!(CallTreeEngine::restore_from_snapshot(&[], &[bad_entry]).is_err());
}

#[test]
fn test_snapshot_json_rejects_garbage() {
    assert!(matches!(
        GraphSnapshot::from_json("not json"),
        Err(SnapshotError::Malformed(_))
    ));
    let wrong_version = r#"{"version": 2, "max_depth": 1, "entry_points": [], "trees": []}"#;
    assert!(matches!(
        GraphSnapshot::from_json(wrong_version),
        Err(SnapshotError::UnsupportedVersion { found: 2, .. })
    ));
}
