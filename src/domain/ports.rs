use crate::domain::error::FactProviderError;
use crate::domain::facts::{ClassFact, FactStore};
use crate::domain::node::{EntryPoint, Layer};
use anyhow::Result;

/// Parsed-fact source port (implemented by Infrastructure)
pub trait FactProvider {
    /// Source files known to the provider, in a stable order.
    fn source_files(&self) -> Result<Vec<String>>;

    /// Facts for one file. An error only affects that file.
    fn facts_for(&self, file: &str) -> Result<Vec<ClassFact>, FactProviderError>;
}

/// Framework-specific entry point and layer classifier port
pub trait EntryPointClassifier: Send + Sync {
    /// Layer of `class_name.method_name`. `class` is `None` for types without parsed facts.
    fn classify_layer(&self, class_name: &str, class: Option<&ClassFact>, method_name: &str)
    -> Layer;

    /// Program entry points across all classes.
    fn extract_entry_points(&self, facts: &FactStore) -> Vec<EntryPoint>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
