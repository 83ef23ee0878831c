//! Interface-to-implementation dispatch expansion.
//!
//! For a call `X → Interface.m` an edge `X → Impl.m` is added for every concrete implementor
//! declaring `m`. The interface edge itself is kept. Misses are diagnostics only.

use serde::Serialize;
use tracing::debug;

use crate::domain::graph::CallGraph;
use crate::domain::node::{EntryPoint, MethodSignature, signature};
use crate::domain::resolver::Resolution;
use crate::domain::type_registry::TypeRegistry;

/// A call site after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    pub caller: MethodSignature,
    pub resolution: Resolution,
}

/// Counters for one expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub interface_calls: usize,
    pub expanded_edges: usize,
    pub expanded_entry_points: usize,
    pub misses: usize,
}

pub struct DispatchExpander<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> DispatchExpander<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Implementing classes of `interface` that declare `method`, as signatures.
    pub fn targets(&self, interface: &str, method: &str) -> Vec<MethodSignature> {
        if !self.registry.is_interface(interface) {
            return Vec::new();
        }
        self.registry
            .implementors(interface)
            .into_iter()
            .filter(|class| self.registry.declares_method(class, method))
            .map(|class| signature(class, method))
            .collect()
    }

    /// Add implementation edges for every resolved interface call.
    pub fn expand_calls(&self, graph: &mut CallGraph, calls: &[ResolvedCall]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for call in calls {
            let Resolution::Resolved { class, method } = &call.resolution else {
                continue;
            };
            if !self.registry.is_interface(class) {
                continue;
            }
            report.interface_calls += 1;

            let targets = self.targets(class, method);
            if targets.is_empty() {
                debug!(
                    caller = %call.caller,
                    callee = %call.resolution.signature(),
                    "no implementation found for interface call"
                );
                report.misses += 1;
                continue;
            }
            for target in targets {
                if graph.add_edge(&call.caller, &target) {
                    report.expanded_edges += 1;
                }
            }
        }
        report
    }

    /// Replace entry points declared on interfaces by one entry point per implementation.
    ///
    /// Interface entry points without implementors are kept as they are; with
    /// `keep_interface_entries` the interface entry point is kept alongside its expansions.
    pub fn expand_entry_points(
        &self,
        entry_points: Vec<EntryPoint>,
        keep_interface_entries: bool,
        report: &mut DispatchReport,
    ) -> Vec<EntryPoint> {
        let mut out: Vec<EntryPoint> = Vec::with_capacity(entry_points.len());
        for entry in entry_points {
            let targets = self.targets(&entry.class_name, entry.method_name());
            if targets.is_empty() {
                if self.registry.is_interface(&entry.class_name) {
                    debug!(entry = %entry.signature, "interface entry point has no implementation");
                    report.misses += 1;
                }
                push_unique(&mut out, entry);
                continue;
            }

            for target in &targets {
                let class_name = target
                    .rsplit_once('.')
                    .map(|(class, _)| class)
                    .unwrap_or(target.as_str());
                let file_path = self
                    .registry
                    .get(class_name)
                    .map(|info| info.file_path.clone())
                    .unwrap_or_default();
                push_unique(
                    &mut out,
                    EntryPoint {
                        kind: entry.kind.clone(),
                        path: entry.path.clone(),
                        signature: target.clone(),
                        class_name: class_name.to_string(),
                        file_path,
                    },
                );
                report.expanded_entry_points += 1;
            }
            if keep_interface_entries {
                push_unique(&mut out, entry);
            }
        }
        out
    }
}

fn push_unique(out: &mut Vec<EntryPoint>, entry: EntryPoint) {
    if !out.iter().any(|e| e.signature == entry.signature) {
        out.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facts::{ClassFact, FactStore, MethodFact};

    fn class(name: &str, is_interface: bool, interfaces: &[&str], methods: &[&str]) -> ClassFact {
        ClassFact {
            name: name.to_string(),
            is_interface,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            methods: methods
                .iter()
                .map(|m| MethodFact {
                    name: m.to_string(),
                    ..Default::default()
                })
                .collect(),
            file_path: format!("{}.java", name),
            ..Default::default()
        }
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::build(&FactStore::new(vec![
            class("Svc", true, &[], &["m"]),
            class("A", false, &["Svc"], &["m"]),
            class("B", false, &["Svc"], &["m"]),
            class("C", false, &["Svc"], &["other"]),
        ]))
    }

    fn call(caller: &str, class: &str, method: &str) -> ResolvedCall {
        ResolvedCall {
            caller: caller.to_string(),
            resolution: Resolution::Resolved {
                class: class.to_string(),
                method: method.to_string(),
            },
        }
    }

    #[test]
    fn expands_to_implementors_declaring_method() {
        let registry = registry();
        let expander = DispatchExpander::new(&registry);
        let mut graph = CallGraph::new();
        graph.add_edge("X.run", "Svc.m");

        let report = expander.expand_calls(&mut graph, &[call("X.run", "Svc", "m")]);
        assert_eq!(graph.successors("X.run"), vec!["A.m", "B.m", "Svc.m"]);
        assert!(!graph.has_node("C.m"));
        assert_eq!(report.expanded_edges, 2);
        assert_eq!(report.misses, 0);
    }

    #[test]
    fn miss_leaves_graph_unchanged() {
        let registry = registry();
        let expander = DispatchExpander::new(&registry);
        let mut graph = CallGraph::new();
        graph.add_edge("X.run", "Svc.unknown");

        let report = expander.expand_calls(&mut graph, &[call("X.run", "Svc", "unknown")]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(report.misses, 1);
    }

    #[test]
    fn heuristic_and_class_calls_are_ignored() {
        let registry = registry();
        let expander = DispatchExpander::new(&registry);
        let mut graph = CallGraph::new();
        let calls = vec![
            call("X.run", "A", "m"),
            ResolvedCall {
                caller: "X.run".to_string(),
                resolution: Resolution::Heuristic {
                    expression: "svc.m".to_string(),
                },
            },
        ];
        let report = expander.expand_calls(&mut graph, &calls);
        assert_eq!(report, DispatchReport::default());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn interface_entry_point_resolves_to_implementations() {
        let registry = registry();
        let expander = DispatchExpander::new(&registry);
        let mut report = DispatchReport::default();
        let entries = vec![EntryPoint::new("GET", "/m", "Svc", "m", "Svc.java")];

        let expanded = expander.expand_entry_points(entries.clone(), false, &mut report);
        let signatures: Vec<_> = expanded.iter().map(|e| e.signature.as_str()).collect();
        assert_eq!(signatures, vec!["A.m", "B.m"]);
        assert_eq!(expanded[0].path, "/m");
        assert_eq!(expanded[0].file_path, "A.java");
        assert_eq!(report.expanded_entry_points, 2);

        let kept = expander.expand_entry_points(entries, true, &mut report);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn entry_point_without_implementor_is_kept() {
        let registry = registry();
        let expander = DispatchExpander::new(&registry);
        let mut report = DispatchReport::default();
        let entries = vec![EntryPoint::new("GET", "/x", "Svc", "nothing", "Svc.java")];
        let expanded = expander.expand_entry_points(entries.clone(), false, &mut report);
        assert_eq!(expanded, entries);
        assert_eq!(report.misses, 1);
    }
}
