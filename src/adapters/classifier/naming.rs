use crate::domain::facts::{ClassFact, FactStore};
use crate::domain::node::{EntryPoint, Layer};
use crate::domain::ports::EntryPointClassifier;

const BATCH_SUFFIXES: &[&str] = &["Job", "Tasklet"];
const BATCH_METHODS: &[&str] = &["execute", "run"];

/// Classifier for code bases without framework annotations
///
/// Conventions:
/// - `*Controller` → Controller, `*Service` / `*ServiceImpl` → Service,
///   `*Repository` / `*Dao` / `*Mapper` (and their `Impl`) → Repository
/// - every `*Controller` method is a `HANDLER` entry point
/// - `execute` / `run` on `*Job` / `*Tasklet` classes are `BATCH` entry points
pub struct NamingConventionClassifier;

impl EntryPointClassifier for NamingConventionClassifier {
    fn classify_layer(&self, class_name: &str, _class: Option<&ClassFact>, _method_name: &str) -> Layer {
        let base = class_name.strip_suffix("Impl").unwrap_or(class_name);
        if base.ends_with("Controller") {
            Layer::controller()
        } else if base.ends_with("Service") {
            Layer::service()
        } else if ["Repository", "Dao", "DAO", "Mapper"]
            .iter()
            .any(|suffix| base.ends_with(suffix))
        {
            Layer::repository()
        } else {
            Layer::unknown()
        }
    }

    fn extract_entry_points(&self, facts: &FactStore) -> Vec<EntryPoint> {
        let mut entries = Vec::new();
        for class in facts.classes() {
            let name = class.name.as_str();
            if name.is_empty() {
                continue;
            }

            if name.ends_with("Controller") {
                for method in class.methods.iter().filter(|m| is_handler_name(&m.name, name)) {
                    entries.push(EntryPoint::new(
                        "HANDLER",
                        "",
                        name,
                        &method.name,
                        class.file_path.clone(),
                    ));
                }
            } else if !class.is_interface && BATCH_SUFFIXES.iter().any(|s| name.ends_with(s)) {
                for method in class
                    .methods
                    .iter()
                    .filter(|m| BATCH_METHODS.contains(&m.name.as_str()))
                {
                    entries.push(EntryPoint::new(
                        "BATCH",
                        name,
                        name,
                        &method.name,
                        class.file_path.clone(),
                    ));
                }
            }
        }
        entries
    }

    fn name(&self) -> &str {
        "naming"
    }
}

/// Constructors, synthetic lambdas and underscore-prefixed helpers are not handlers.
fn is_handler_name(method: &str, class_name: &str) -> bool {
    !method.is_empty()
        && method != class_name
        && !method.starts_with('_')
        && !method.starts_with("lambda$")
        && method != "<init>"
}
