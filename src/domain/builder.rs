use crate::domain::analysis::CallGraphAnalysis;
use crate::domain::dispatch::{DispatchExpander, DispatchReport, ResolvedCall};
use crate::domain::facts::{ClassFact, FactStore};
use crate::domain::graph::CallGraph;
use crate::domain::node::{Layer, UNKNOWN, signature, split_signature};
use crate::domain::ports::{EntryPointClassifier, FactProvider};
use crate::domain::resolver::{CallResolver, Resolution};
use crate::domain::symbol_table::SymbolTable;
use crate::domain::type_registry::TypeRegistry;
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Knobs for one build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Keep interface entry points next to their implementation entry points.
    pub keep_interface_entry_points: bool,
}

/// Counters describing one build, logged once and kept on the analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub classes: usize,
    pub methods: usize,
    pub nodes: usize,
    pub edges: usize,
    pub resolved_calls: usize,
    pub heuristic_calls: usize,
    pub skipped_calls: usize,
    pub skipped_classes: usize,
    pub skipped_files: usize,
    pub entry_points: usize,
    pub dispatch: DispatchReport,
}

/// Facts gathered from a provider plus the files that had to be skipped
#[derive(Debug, Default)]
pub struct CollectedFacts {
    pub store: FactStore,
    pub skipped_files: Vec<String>,
}

/// Graph builder - Domain Service for constructing the call graph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Gather facts file by file. A file the provider fails on is logged and skipped.
    pub fn collect_facts(provider: &dyn FactProvider) -> Result<CollectedFacts> {
        let mut classes = Vec::new();
        let mut skipped_files = Vec::new();
        for file in provider.source_files()? {
            match provider.facts_for(&file) {
                Ok(mut facts) => {
                    for class in &mut facts {
                        if class.file_path.is_empty() {
                            class.file_path = file.clone();
                        }
                    }
                    classes.extend(facts);
                }
                Err(err) => {
                    warn!(file = %file, error = %err, "skipping file that failed upstream parsing");
                    skipped_files.push(file);
                }
            }
        }
        Ok(CollectedFacts {
            store: FactStore::new(classes),
            skipped_files,
        })
    }

    /// Build from provider output, carrying the skipped-file count into the summary.
    pub fn build_collected(
        &self,
        collected: CollectedFacts,
        classifier: Option<&dyn EntryPointClassifier>,
    ) -> CallGraphAnalysis {
        let skipped = collected.skipped_files.len();
        let mut analysis = self.build(collected.store, classifier);
        analysis.summary.skipped_files = skipped;
        analysis
    }

    /// Build strategy:
    /// 1. symbol tables and type registry
    /// 2. one node per declared method
    /// 3. resolve raw calls into edges
    /// 4. dispatch expansion over calls and entry points
    /// 5. layer classification
    pub fn build(
        &self,
        facts: FactStore,
        classifier: Option<&dyn EntryPointClassifier>,
    ) -> CallGraphAnalysis {
        let symbols = SymbolTable::build(&facts);
        let registry = TypeRegistry::build(&facts);
        let resolver = CallResolver::new(&facts);
        let mut graph = CallGraph::new();
        let mut summary = BuildSummary {
            classes: facts.len(),
            methods: facts.method_count(),
            ..Default::default()
        };

        // Pass 1: Node Allocation
        for class in facts.classes() {
            if !is_well_formed(class) {
                warn!(file = %class.file_path, "skipping class without a name");
                summary.skipped_classes += 1;
                continue;
            }
            for method in &class.methods {
                if method.name.trim().is_empty() {
                    debug!(class = %class.name, "skipping method without a name");
                    continue;
                }
                graph.add_node(
                    &signature(&class.name, &method.name),
                    &class.name,
                    file_or_unknown(&class.file_path),
                    Layer::unknown(),
                );
            }
        }

        // Pass 2: Call Resolution and Edge Wiring
        let mut calls: Vec<ResolvedCall> = Vec::new();
        for class in facts.classes().iter().filter(|c| is_well_formed(c)) {
            for method in class.methods.iter().filter(|m| !m.name.trim().is_empty()) {
                let caller = signature(&class.name, &method.name);
                let scope = symbols.scope(&class.name, method);
                for raw in &method.calls {
                    let Some(resolution) = resolver.resolve(&scope, raw) else {
                        debug!(caller = %caller, call = %raw, "skipping empty call expression");
                        summary.skipped_calls += 1;
                        continue;
                    };

                    let callee = resolution.signature();
                    match &resolution {
                        Resolution::Resolved { class: callee_class, .. } => {
                            summary.resolved_calls += 1;
                            let file = registry
                                .get(callee_class)
                                .map(|info| info.file_path.as_str())
                                .unwrap_or(UNKNOWN);
                            graph.add_node(&callee, callee_class, file_or_unknown(file), Layer::unknown());
                        }
                        Resolution::Heuristic { expression } => {
                            debug!(caller = %caller, call = %expression, "receiver type unknown, keeping literal expression");
                            summary.heuristic_calls += 1;
                        }
                    }

                    graph.add_edge(&caller, &callee);
                    calls.push(ResolvedCall { caller: caller.clone(), resolution });
                }
            }
        }

        // Pass 3: Dispatch Expansion
        let expander = DispatchExpander::new(&registry);
        let mut dispatch = expander.expand_calls(&mut graph, &calls);

        let declared = classifier
            .map(|c| c.extract_entry_points(&facts))
            .unwrap_or_default();
        let entry_points = expander.expand_entry_points(
            declared,
            self.options.keep_interface_entry_points,
            &mut dispatch,
        );
        for entry in &entry_points {
            graph.add_node(
                &entry.signature,
                &entry.class_name,
                file_or_unknown(&entry.file_path),
                Layer::unknown(),
            );
        }

        // Pass 4: Layer Classification
        if let Some(classifier) = classifier {
            classify_layers(&mut graph, &facts, classifier);
        }

        summary.nodes = graph.node_count();
        summary.edges = graph.edge_count();
        summary.entry_points = entry_points.len();
        summary.dispatch = dispatch;
        info!(
            classes = summary.classes,
            nodes = summary.nodes,
            edges = summary.edges,
            entry_points = summary.entry_points,
            heuristic_calls = summary.heuristic_calls,
            dispatch_edges = summary.dispatch.expanded_edges,
            "call graph built"
        );

        CallGraphAnalysis::from_parts(graph, entry_points, summary)
    }
}

fn is_well_formed(class: &ClassFact) -> bool {
    !class.name.trim().is_empty()
}

fn file_or_unknown(file: &str) -> &str {
    if file.is_empty() { UNKNOWN } else { file }
}

fn classify_layers(graph: &mut CallGraph, facts: &FactStore, classifier: &dyn EntryPointClassifier) {
    let targets: Vec<(String, String)> = graph
        .nodes()
        .filter(|n| n.class_name != UNKNOWN)
        .map(|n| (n.signature.clone(), n.class_name.clone()))
        .collect();
    for (sig, class_name) in targets {
        let method = split_signature(&sig).1.to_string();
        let layer = classifier.classify_layer(&class_name, facts.get(&class_name), &method);
        if let Some(node) = graph.node_mut(&sig) {
            node.layer = layer;
        }
    }
}
