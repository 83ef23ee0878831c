//! Analysis configuration, loaded from an optional JSON file. Every field has a default.

use crate::domain::analysis::MAX_TREE_DEPTH;
use anyhow::{Context as _, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which entry point classifier drives layer and entry point detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ClassifierKind {
    Spring,
    Naming,
    #[default]
    Composite,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_depth: usize,
    pub classifier: ClassifierKind,
    pub include_interface_entry_points: bool,
    pub port: u16,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            classifier: ClassifierKind::default(),
            include_interface_entry_points: false,
            port: 8118,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_TREE_DEPTH {
            bail!(
                "max_depth {} exceeds the limit of {}",
                self.max_depth,
                MAX_TREE_DEPTH
            );
        }
        Ok(())
    }
}
