//! Entry point classifier adapters
//!
//! Frameworks mark their entry points differently. Each classifier knows one
//! convention; the composite classifier chains them.

mod naming;
mod spring;

pub use naming::NamingConventionClassifier;
pub use spring::SpringClassifier;

use crate::config::ClassifierKind;
use crate::domain::facts::{ClassFact, FactStore};
use crate::domain::node::{EntryPoint, Layer};
use crate::domain::ports::EntryPointClassifier;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Build the classifier selected in configuration. `None` disables classification.
pub fn classifier_for(kind: ClassifierKind) -> Option<Box<dyn EntryPointClassifier>> {
    match kind {
        ClassifierKind::Spring => Some(Box::new(SpringClassifier)),
        ClassifierKind::Naming => Some(Box::new(NamingConventionClassifier)),
        ClassifierKind::Composite => Some(Box::new(CompositeClassifier::new())),
        ClassifierKind::None => None,
    }
}

/// Chains classifiers: the first non-Unknown layer wins and entry points are
/// merged, keeping the first one seen per signature.
pub struct CompositeClassifier {
    classifiers: Vec<Box<dyn EntryPointClassifier>>,
}

impl CompositeClassifier {
    pub fn new() -> Self {
        Self {
            classifiers: vec![
                Box::new(SpringClassifier),
                Box::new(NamingConventionClassifier),
            ],
        }
    }

    pub fn with_classifiers(classifiers: Vec<Box<dyn EntryPointClassifier>>) -> Self {
        Self { classifiers }
    }
}

impl Default for CompositeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPointClassifier for CompositeClassifier {
    fn classify_layer(&self, class_name: &str, class: Option<&ClassFact>, method_name: &str) -> Layer {
        self.classifiers
            .iter()
            .map(|c| c.classify_layer(class_name, class, method_name))
            .find(|layer| !layer.is_unknown())
            .unwrap_or_default()
    }

    fn extract_entry_points(&self, facts: &FactStore) -> Vec<EntryPoint> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for classifier in &self.classifiers {
            for entry in classifier.extract_entry_points(facts) {
                if seen.insert(entry.signature.clone()) {
                    merged.push(entry);
                }
            }
        }
        merged
    }

    fn name(&self) -> &str {
        "composite"
    }
}

/// A source annotation split into its simple name and raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Annotation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

fn annotation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*@([\w.]+)\s*(?:\((.*)\))?\s*$").expect("annotation regex")
    })
}

fn string_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("string literal regex"))
}

/// Parse `@pkg.Name(args)`; the name is reduced to its last segment.
pub(crate) fn parse_annotation(raw: &str) -> Option<Annotation<'_>> {
    let caps = annotation_regex().captures(raw)?;
    let full = caps.get(1)?.as_str();
    let name = full.rsplit('.').next().unwrap_or(full);
    let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    Some(Annotation { name, args })
}

/// First `"..."` literal in annotation arguments.
pub(crate) fn first_string_literal(args: &str) -> Option<&str> {
    string_literal_regex()
        .captures(args)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn has_annotation(annotations: &[String], names: &[&str]) -> bool {
    annotations
        .iter()
        .filter_map(|a| parse_annotation(a))
        .any(|a| names.contains(&a.name))
}
