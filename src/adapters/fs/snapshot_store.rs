use crate::domain::snapshot::GraphSnapshot;
use anyhow::{Context, Result};
use std::path::Path;

/// Write a snapshot as pretty JSON, replacing any existing file.
pub fn write_snapshot(path: &Path, snapshot: &GraphSnapshot) -> Result<()> {
    let json = snapshot.to_json().context("Failed to serialize snapshot")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot file: {}", path.display()))
}

/// Read and validate a snapshot file.
pub fn read_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    GraphSnapshot::from_slice(&bytes)
        .with_context(|| format!("Invalid snapshot file: {}", path.display()))
}
