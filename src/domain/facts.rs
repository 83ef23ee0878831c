//! Parsed source facts: the contract between an upstream parser (the fact provider) and the
//! call-graph builder.
//!
//! **Provider mapping**: one source file yields zero or more [`ClassFact`]s. **Builder usage**:
//! class name + method name form the node key, `fields`/`parameters`/`locals` feed the symbol
//! tables, `calls` are the raw call expressions to resolve, `interfaces` drive dispatch
//! expansion, `annotations` feed entry-point classifiers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One parsed class or interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFact {
    /// Simple class name (e.g. `UserServiceImpl`).
    pub name: String,
    /// Package / namespace (e.g. `com.acme.user`); empty for the default package.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub is_interface: bool,
    /// Implemented interfaces as written in source, simple or qualified.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Class-level annotations as written (e.g. `@RequestMapping("/users")`).
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldFact>,
    #[serde(default)]
    pub methods: Vec<MethodFact>,
    /// Owning file, relative to the project root.
    #[serde(default)]
    pub file_path: String,
}

impl ClassFact {
    /// `package.Name`, or just `Name` for the default package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodFact> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn declares_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }
}

/// A field declaration. `declared_type` is stored raw; symbol tables strip generics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFact {
    pub name: String,
    pub declared_type: String,
}

/// A named, typed binding (method parameter or local variable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableFact {
    pub name: String,
    pub declared_type: String,
}

/// One method with its raw, unresolved call expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodFact {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<VariableFact>,
    #[serde(default)]
    pub locals: Vec<VariableFact>,
    /// Raw call expressions, `method` or `receiver.method`.
    #[serde(default)]
    pub calls: Vec<String>,
    /// Optional body text, only consumed by classifier heuristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Read-only collection of every class fact in one build.
///
/// Passed explicitly to the builder and classifiers; there is no shared global cache.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    classes: Vec<ClassFact>,
    by_name: HashMap<String, Vec<usize>>,
    by_qualified: HashMap<String, usize>,
}

impl FactStore {
    pub fn new(classes: Vec<ClassFact>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_qualified = HashMap::new();
        for (idx, class) in classes.iter().enumerate() {
            by_name.entry(class.name.clone()).or_default().push(idx);
            by_qualified.entry(class.qualified_name()).or_insert(idx);
        }
        Self {
            classes,
            by_name,
            by_qualified,
        }
    }

    pub fn classes(&self) -> &[ClassFact] {
        &self.classes
    }

    /// Lookup by simple name, falling back to the qualified name. When several classes share
    /// a simple name the first one provided wins.
    pub fn get(&self, name: &str) -> Option<&ClassFact> {
        self.by_name
            .get(name)
            .and_then(|indices| indices.first())
            .or_else(|| self.by_qualified.get(name))
            .map(|&idx| &self.classes[idx])
    }

    pub fn get_qualified(&self, qualified_name: &str) -> Option<&ClassFact> {
        self.by_qualified
            .get(qualified_name)
            .map(|&idx| &self.classes[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(|c| c.methods.len()).sum()
    }
}

impl From<Vec<ClassFact>> for FactStore {
    fn from(classes: Vec<ClassFact>) -> Self {
        Self::new(classes)
    }
}
