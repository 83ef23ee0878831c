//! Declared-type lookup tables used by call resolution.
//!
//! [`SymbolTable`] holds one field-type map per class. [`MethodScope`] layers a method's
//! parameters and locals on top of its class's fields; method bindings shadow fields.

use std::collections::HashMap;

use crate::domain::facts::{ClassFact, FactStore, MethodFact};

/// Reduce a declared type to its raw container name.
///
/// `List<User>` → `List`, `Map<String, List<X>>` → `Map`, `User[]` → `User`,
/// `final User` → `User`, `User...` → `User`.
pub fn strip_generics(declared: &str) -> String {
    let raw = declared.split('<').next().unwrap_or_default();
    let raw = raw.trim().trim_end_matches("...");
    let raw = raw.trim_end_matches("[]").trim();
    // Modifiers such as `final` or `@NonNull` precede the type name.
    raw.split_whitespace().last().unwrap_or_default().to_string()
}

/// Class name → (field name → raw field type).
#[derive(Debug, Default)]
pub struct SymbolTable {
    fields: HashMap<String, HashMap<String, String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build field tables for every class in the store.
    pub fn build(store: &FactStore) -> Self {
        let mut table = Self::new();
        for class in store.classes() {
            table.register_class(class);
        }
        table
    }

    /// Register the field table of one class. Fields with an empty type are ignored. When
    /// several classes share a simple name the first one registered wins.
    pub fn register_class(&mut self, class: &ClassFact) {
        if self.fields.contains_key(&class.name) {
            return;
        }
        let entry = self.fields.entry(class.name.clone()).or_default();
        for field in &class.fields {
            let ty = strip_generics(&field.declared_type);
            if field.name.is_empty() || ty.is_empty() {
                continue;
            }
            entry.entry(field.name.clone()).or_insert(ty);
        }
    }

    pub fn field_type(&self, class: &str, field: &str) -> Option<&str> {
        self.fields
            .get(class)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    pub fn class_count(&self) -> usize {
        self.fields.len()
    }

    /// Local lookup scope for one method of `class`.
    pub fn scope<'a>(&'a self, class: &'a str, method: &MethodFact) -> MethodScope<'a> {
        let mut locals = HashMap::new();
        for binding in method.parameters.iter().chain(method.locals.iter()) {
            let ty = strip_generics(&binding.declared_type);
            if binding.name.is_empty() || ty.is_empty() {
                continue;
            }
            locals.insert(binding.name.clone(), ty);
        }
        MethodScope {
            class,
            fields: self.fields.get(class),
            locals,
        }
    }
}

/// Per-method lookup: locals and parameters first, then the enclosing class's fields.
#[derive(Debug)]
pub struct MethodScope<'a> {
    class: &'a str,
    fields: Option<&'a HashMap<String, String>>,
    locals: HashMap<String, String>,
}

impl<'a> MethodScope<'a> {
    pub fn enclosing_class(&self) -> &str {
        self.class
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.local_type(name).or_else(|| self.field_type(name))
    }

    pub fn local_type(&self, name: &str) -> Option<&str> {
        self.locals.get(name).map(String::as_str)
    }

    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.fields
            .and_then(|fields| fields.get(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facts::{FieldFact, VariableFact};

    fn var(name: &str, ty: &str) -> VariableFact {
        VariableFact {
            name: name.to_string(),
            declared_type: ty.to_string(),
        }
    }

    fn class_with_fields(name: &str, fields: &[(&str, &str)]) -> ClassFact {
        ClassFact {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(n, t)| FieldFact {
                    name: n.to_string(),
                    declared_type: t.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn strip_generics_collapses_containers() {
        assert_eq!(strip_generics("List<User>"), "List");
        assert_eq!(strip_generics("Map<String, List<Order>>"), "Map");
        assert_eq!(strip_generics("User[]"), "User");
        assert_eq!(strip_generics("final UserRepository"), "UserRepository");
        assert_eq!(strip_generics("String..."), "String");
        assert_eq!(strip_generics("  "), "");
    }

    #[test]
    fn field_types_are_stripped() {
        let store = FactStore::new(vec![class_with_fields(
            "Svc",
            &[("repo", "UserRepository"), ("cache", "Map<String, User>")],
        )]);
        let table = SymbolTable::build(&store);
        assert_eq!(table.field_type("Svc", "repo"), Some("UserRepository"));
        assert_eq!(table.field_type("Svc", "cache"), Some("Map"));
        assert_eq!(table.field_type("Svc", "missing"), None);
        assert_eq!(table.field_type("Other", "repo"), None);
    }

    #[test]
    fn first_class_with_a_simple_name_owns_its_fields() {
        let mut first = class_with_fields("Util", &[]);
        first.package = "com.a".to_string();
        let mut second = class_with_fields("Util", &[("client", "HttpClient")]);
        second.package = "com.b".to_string();
        let table = SymbolTable::build(&FactStore::new(vec![first, second]));
        assert_eq!(table.class_count(), 1);
        assert_eq!(table.field_type("Util", "client"), None);
    }

    #[test]
    fn method_bindings_shadow_fields() {
        let store = FactStore::new(vec![class_with_fields("Svc", &[("repo", "UserRepository")])]);
        let table = SymbolTable::build(&store);
        let method = MethodFact {
            name: "run".to_string(),
            parameters: vec![var("repo", "AuditRepository")],
            locals: vec![var("items", "List<Item>")],
            ..Default::default()
        };
        let scope = table.scope("Svc", &method);
        assert_eq!(scope.lookup("repo"), Some("AuditRepository"));
        assert_eq!(scope.field_type("repo"), Some("UserRepository"));
        assert_eq!(scope.lookup("items"), Some("List"));
        assert_eq!(scope.lookup("nothing"), None);
        assert_eq!(scope.enclosing_class(), "Svc");
    }

    #[test]
    fn local_declared_after_parameter_wins() {
        let table = SymbolTable::new();
        let method = MethodFact {
            name: "run".to_string(),
            parameters: vec![var("x", "A")],
            locals: vec![var("x", "B")],
            ..Default::default()
        };
        assert_eq!(table.scope("Unparsed", &method).lookup("x"), Some("B"));
    }
}
