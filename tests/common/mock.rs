//! Mock port implementations for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::Result;
use callpath::domain::error::FactProviderError;
use callpath::domain::facts::{ClassFact, FactStore};
use callpath::domain::node::{EntryPoint, Layer};
use callpath::domain::ports::{EntryPointClassifier, FactProvider};

/// In-memory FactProvider; files listed in `failing` report a parse error.
pub struct MockFactProvider {
    pub files: Vec<(String, Vec<ClassFact>)>,
    pub failing: Vec<String>,
}

impl MockFactProvider {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            failing: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: &str, classes: Vec<ClassFact>) -> Self {
        self.files.push((path.to_string(), classes));
        self
    }

    pub fn with_failing_file(mut self, path: &str) -> Self {
        self.failing.push(path.to_string());
        self
    }
}

impl Default for MockFactProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FactProvider for MockFactProvider {
    fn source_files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = self.files.iter().map(|(p, _)| p.clone()).collect();
        files.extend(self.failing.iter().cloned());
        Ok(files)
    }

    fn facts_for(&self, file: &str) -> Result<Vec<ClassFact>, FactProviderError> {
        if self.failing.iter().any(|f| f == file) {
            return Err(FactProviderError::parse(file, "mock parse failure"));
        }
        self.files
            .iter()
            .find(|(p, _)| p == file)
            .map(|(_, classes)| classes.clone())
            .ok_or_else(|| FactProviderError::UnknownFile(file.to_string()))
    }
}

/// Classifier with fixed layers per class name and a fixed entry point list.
pub struct MockClassifier {
    pub layers: HashMap<String, Layer>,
    pub entry_points: Vec<EntryPoint>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
            entry_points: Vec::new(),
        }
    }

    pub fn with_layer(mut self, class_name: &str, layer: Layer) -> Self {
        self.layers.insert(class_name.to_string(), layer);
        self
    }

    pub fn with_entry_point(mut self, kind: &str, path: &str, class_name: &str, method: &str) -> Self {
        self.entry_points.push(EntryPoint::new(
            kind,
            path,
            class_name,
            method,
            format!("{}.java", class_name),
        ));
        self
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPointClassifier for MockClassifier {
    fn classify_layer(&self, class_name: &str, _class: Option<&ClassFact>, _method_name: &str) -> Layer {
        self.layers.get(class_name).cloned().unwrap_or_default()
    }

    fn extract_entry_points(&self, _facts: &FactStore) -> Vec<EntryPoint> {
        self.entry_points.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
