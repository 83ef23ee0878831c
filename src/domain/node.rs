use std::fmt;

use serde::{Deserialize, Serialize};

/// Method signature key: `"ClassName.methodName"`. Overloads share one key.
pub type MethodSignature = String;

/// Sentinel used for every piece of metadata that could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// Join a class and method name into a signature key.
pub fn signature(class: &str, method: &str) -> MethodSignature {
    format!("{}.{}", class, method)
}

/// Split a signature at its last `.` into `(qualifier, method)`.
///
/// A signature without a dot yields an empty qualifier.
pub fn split_signature(signature: &str) -> (&str, &str) {
    match signature.rsplit_once('.') {
        Some((qualifier, method)) => (qualifier, method),
        None => ("", signature),
    }
}

/// Coarse architectural label (Controller, Service, Repository, ...).
///
/// Never absent: nodes without a classification carry [`Layer::unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer(String);

impl Layer {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        if label.trim().is_empty() {
            Self::unknown()
        } else {
            Self(label)
        }
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    pub fn controller() -> Self {
        Self::new("Controller")
    }

    pub fn service() -> Self {
        Self::new("Service")
    }

    pub fn repository() -> Self {
        Self::new("Repository")
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Call graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub signature: MethodSignature,
    pub class_name: String,
    pub file_path: String,
    pub layer: Layer,
}

impl GraphNode {
    pub fn new(
        signature: impl Into<MethodSignature>,
        class_name: impl Into<String>,
        file_path: impl Into<String>,
        layer: Layer,
    ) -> Self {
        Self {
            signature: signature.into(),
            class_name: class_name.into(),
            file_path: file_path.into(),
            layer,
        }
    }

    /// Node with every metadata field set to the Unknown sentinel.
    pub fn unknown(signature: impl Into<MethodSignature>) -> Self {
        Self::new(signature, UNKNOWN, UNKNOWN, Layer::unknown())
    }

    pub fn method_name(&self) -> &str {
        split_signature(&self.signature).1
    }
}

/// Directed caller → callee relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: MethodSignature,
    pub callee: MethodSignature,
}

impl CallEdge {
    pub fn new(caller: impl Into<MethodSignature>, callee: impl Into<MethodSignature>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// A program entry identified by a framework classifier (HTTP endpoint, scheduled job, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Entry kind, e.g. `GET`, `POST`, `SCHEDULED`, `BATCH`.
    pub kind: String,
    /// Route or job descriptor; empty when the framework has none.
    #[serde(default)]
    pub path: String,
    pub signature: MethodSignature,
    pub class_name: String,
    #[serde(default)]
    pub file_path: String,
}

impl EntryPoint {
    pub fn new(
        kind: impl Into<String>,
        path: impl Into<String>,
        class_name: &str,
        method_name: &str,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            signature: signature(class_name, method_name),
            class_name: class_name.to_string(),
            file_path: file_path.into(),
        }
    }

    /// Human-readable descriptor, e.g. `GET /users/{id}`.
    pub fn descriptor(&self) -> String {
        if self.path.is_empty() {
            self.kind.clone()
        } else {
            format!("{} {}", self.kind, self.path)
        }
    }

    pub fn method_name(&self) -> &str {
        split_signature(&self.signature).1
    }
}
