//! Type Registry - class/interface facts indexed for dispatch expansion
//!
//! Types are not graph nodes. The registry answers "is this type an interface" and "which
//! concrete classes implement it" without walking the fact list on every call edge.

use std::collections::{HashMap, HashSet};

use crate::domain::facts::FactStore;
use crate::domain::symbol_table::strip_generics;

/// Type kind as far as dispatch is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Per-type attributes kept by the registry
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub name: String,
    pub qualified_name: String,
    pub kind: TypeKind,
    pub file_path: String,
    pub methods: HashSet<String>,
}

impl TypeInfo {
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// Type Registry - built once per build from the fact store
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeInfo>,
    /// Interface name as written in `implements` clauses → concrete classes, in fact order.
    declared_implementors: HashMap<String, Vec<String>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(store: &FactStore) -> Self {
        let mut registry = Self::new();
        for class in store.classes() {
            if class.name.is_empty() {
                continue;
            }
            let info = TypeInfo {
                name: class.name.clone(),
                qualified_name: class.qualified_name(),
                kind: if class.is_interface {
                    TypeKind::Interface
                } else {
                    TypeKind::Class
                },
                file_path: class.file_path.clone(),
                methods: class.methods.iter().map(|m| m.name.clone()).collect(),
            };
            registry.register(info);

            if class.is_interface {
                continue;
            }
            for declared in &class.interfaces {
                let raw = strip_generics(declared);
                if raw.is_empty() {
                    continue;
                }
                let implementors = registry.declared_implementors.entry(raw).or_default();
                if !implementors.contains(&class.name) {
                    implementors.push(class.name.clone());
                }
            }
        }
        registry
    }

    /// Register a type. First registration of a simple name wins.
    pub fn register(&mut self, info: TypeInfo) {
        self.types.entry(info.name.clone()).or_insert(info);
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// A parsed interface, or an unparsed type that some class declares it implements
    /// (e.g. a library interface).
    pub fn is_interface(&self, name: &str) -> bool {
        match self.types.get(name) {
            Some(info) => info.is_interface(),
            None => self.declared_implementors.contains_key(name),
        }
    }

    pub fn declares_method(&self, class: &str, method: &str) -> bool {
        self.types
            .get(class)
            .is_some_and(|info| info.methods.contains(method))
    }

    /// Concrete classes implementing `interface`. Classes naming it by simple name come first,
    /// then classes naming it by qualified name.
    pub fn implementors(&self, interface: &str) -> Vec<&str> {
        let simple = interface.rsplit('.').next().unwrap_or(interface);
        let mut keys = vec![simple.to_string()];
        if let Some(info) = self.types.get(simple) {
            keys.push(info.qualified_name.clone());
        }
        if interface != simple {
            keys.push(interface.to_string());
        }

        let mut out: Vec<&str> = Vec::new();
        for key in keys {
            for class in self.declared_implementors.get(&key).into_iter().flatten() {
                if !out.contains(&class.as_str()) {
                    out.push(class);
                }
            }
        }
        out
    }

    pub fn type_names(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facts::{ClassFact, MethodFact};

    fn class(name: &str, package: &str, is_interface: bool, interfaces: &[&str]) -> ClassFact {
        ClassFact {
            name: name.to_string(),
            package: package.to_string(),
            is_interface,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            methods: vec![MethodFact {
                name: "find".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = TypeRegistry::build(&FactStore::new(vec![class(
            "Repo",
            "com.acme",
            true,
            &[],
        )]));
        let info = registry.get("Repo").unwrap();
        assert!(info.is_interface());
        assert_eq!(info.qualified_name, "com.acme.Repo");
        assert!(registry.declares_method("Repo", "find"));
        assert!(!registry.declares_method("Repo", "save"));
    }

    #[test]
    fn test_implementors_by_simple_and_qualified_name() {
        let registry = TypeRegistry::build(&FactStore::new(vec![
            class("Repo", "com.acme", true, &[]),
            class("JdbcRepo", "com.acme.jdbc", false, &["Repo"]),
            class("JpaRepo", "com.acme.jpa", false, &["com.acme.Repo"]),
            class("Unrelated", "org.other", false, &["org.other.Repo"]),
        ]));
        assert_eq!(registry.implementors("Repo"), vec!["JdbcRepo", "JpaRepo"]);
        assert_eq!(
            registry.implementors("com.acme.Repo"),
            vec!["JdbcRepo", "JpaRepo"]
        );
    }

    #[test]
    fn test_generic_interface_names_are_stripped() {
        let registry = TypeRegistry::build(&FactStore::new(vec![
            class("Handler", "", true, &[]),
            class("UserHandler", "", false, &["Handler<User>"]),
        ]));
        assert_eq!(registry.implementors("Handler"), vec!["UserHandler"]);
    }

    #[test]
    fn test_unparsed_interface_is_recognized_through_implementors() {
        let registry = TypeRegistry::build(&FactStore::new(vec![class(
            "Job",
            "",
            false,
            &["Runnable"],
        )]));
        assert!(registry.is_interface("Runnable"));
        assert!(!registry.is_interface("Job"));
        assert!(!registry.is_interface("Nothing"));
    }

    #[test]
    fn test_interfaces_are_not_implementors() {
        let registry = TypeRegistry::build(&FactStore::new(vec![
            class("Base", "", true, &[]),
            class("Sub", "", true, &["Base"]),
        ]));
        assert!(registry.implementors("Base").is_empty());
    }
}
