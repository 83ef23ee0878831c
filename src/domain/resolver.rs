//! Best-effort resolution of raw call expressions into callee signatures.
//!
//! Resolution order for `receiver.method`: method locals/parameters, then class fields, then
//! the receiver as a class name (static call). A `this.` receiver is looked up in the field
//! table only. Anything else falls back to the literal expression so the call stays traceable.

use crate::domain::facts::FactStore;
use crate::domain::node::{MethodSignature, signature, split_signature};
use crate::domain::symbol_table::{MethodScope, strip_generics};

/// Outcome of resolving one call expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Receiver type is known; `class` may or may not have a parsed ClassFact.
    Resolved { class: String, method: String },
    /// Receiver could not be typed; the normalized expression is used as the signature.
    Heuristic { expression: String },
}

impl Resolution {
    pub fn signature(&self) -> MethodSignature {
        match self {
            Resolution::Resolved { class, method } => signature(class, method),
            Resolution::Heuristic { expression } => expression.clone(),
        }
    }

    pub fn class(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { class, .. } => Some(class),
            Resolution::Heuristic { .. } => None,
        }
    }

    pub fn method(&self) -> &str {
        match self {
            Resolution::Resolved { method, .. } => method,
            Resolution::Heuristic { expression } => split_signature(expression).1,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Resolves call expressions against a method scope and the fact store.
pub struct CallResolver<'a> {
    store: &'a FactStore,
}

impl<'a> CallResolver<'a> {
    pub fn new(store: &'a FactStore) -> Self {
        Self { store }
    }

    /// Resolve `raw` as called from within `scope`. Returns `None` only for expressions that
    /// are empty after normalization.
    pub fn resolve(&self, scope: &MethodScope<'_>, raw: &str) -> Option<Resolution> {
        let CallExpression {
            text: expression,
            explicit_this,
        } = CallExpression::parse(raw);
        if expression.is_empty() {
            return None;
        }

        let (qualifier, method) = split_signature(&expression);
        if method.is_empty() {
            return Some(Resolution::Heuristic { expression });
        }
        if qualifier.is_empty() {
            return Some(Resolution::Resolved {
                class: scope.enclosing_class().to_string(),
                method: method.to_string(),
            });
        }

        let receiver = if explicit_this {
            scope.field_type(qualifier).map(|ty| self.canonical_class(ty))
        } else {
            self.receiver_type(scope, qualifier)
        };
        if let Some(class) = receiver {
            return Some(Resolution::Resolved {
                class,
                method: method.to_string(),
            });
        }

        Some(Resolution::Heuristic {
            expression: signature(qualifier, method),
        })
    }

    fn receiver_type(&self, scope: &MethodScope<'_>, receiver: &str) -> Option<String> {
        if let Some(ty) = scope.lookup(receiver) {
            return Some(self.canonical_class(ty));
        }
        // Static call on a parsed class, simple or qualified.
        self.store.get(receiver).map(|class| class.name.clone())
    }

    /// Prefer the parsed class's simple name so `com.acme.Repo` and `Repo` share a node.
    fn canonical_class(&self, declared: &str) -> String {
        let raw = strip_generics(declared);
        match self.store.get(&raw) {
            Some(class) => class.name.clone(),
            None => raw,
        }
    }
}

/// A call expression with argument lists and a leading `this.` removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpression {
    pub text: String,
    /// The receiver was written as `this.<field>`; locals and parameters must not shadow it.
    pub explicit_this: bool,
}

impl CallExpression {
    pub fn parse(raw: &str) -> Self {
        let stripped = strip_arguments(raw);
        let (rest, explicit_this) = match stripped.strip_prefix("this.") {
            Some(rest) => (rest, true),
            None => (stripped.as_str(), false),
        };
        Self {
            text: rest.trim_matches('.').to_string(),
            explicit_this,
        }
    }
}

/// Drop argument lists and a leading `this.`, and trim whitespace.
///
/// `this.repo.find(id)` → `repo.find`, `a.b().c()` → `a.b.c`.
pub fn normalize_expression(raw: &str) -> String {
    CallExpression::parse(raw).text
}

fn strip_arguments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && !ch.is_whitespace() => out.push(ch),
            _ => {}
        }
    }
    out
}
