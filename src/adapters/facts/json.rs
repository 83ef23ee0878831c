use crate::domain::error::FactProviderError;
use crate::domain::facts::ClassFact;
use crate::domain::ports::FactProvider;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk facts document: `{"files": [{"path": ..., "classes": [...], "error": null}]}`
#[derive(Debug, Default, Deserialize)]
struct FactsDocument {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    path: String,
    #[serde(default)]
    classes: Vec<ClassFact>,
    /// Set by the upstream parser when it could not handle the file.
    #[serde(default)]
    error: Option<String>,
}

/// JSON facts file adapter
pub struct JsonFactProvider {
    files: Vec<FileEntry>,
    index: HashMap<String, usize>,
}

impl JsonFactProvider {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let document = load_facts_document(path.as_ref())?;
        Ok(Self::from_document(document))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: FactsDocument =
            serde_json::from_str(json).context("Failed to parse facts JSON")?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: FactsDocument) -> Self {
        let mut index = HashMap::new();
        for (i, entry) in document.files.iter().enumerate() {
            // First entry wins for a repeated path
            index.entry(entry.path.clone()).or_insert(i);
        }
        Self {
            files: document.files,
            index,
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl FactProvider for JsonFactProvider {
    fn source_files(&self) -> Result<Vec<String>> {
        Ok(self
            .files
            .iter()
            .enumerate()
            .filter(|(i, entry)| self.index.get(&entry.path) == Some(i))
            .map(|(_, entry)| entry.path.clone())
            .collect())
    }

    fn facts_for(&self, file: &str) -> Result<Vec<ClassFact>, FactProviderError> {
        let entry = self
            .index
            .get(file)
            .and_then(|&i| self.files.get(i))
            .ok_or_else(|| FactProviderError::UnknownFile(file.to_string()))?;

        if let Some(reason) = &entry.error {
            return Err(FactProviderError::parse(&entry.path, reason.clone()));
        }

        Ok(entry
            .classes
            .iter()
            .cloned()
            .map(|mut class| {
                if class.file_path.is_empty() {
                    class.file_path = entry.path.clone();
                }
                class
            })
            .collect())
    }
}

fn load_facts_document(path: &Path) -> Result<FactsDocument> {
    use memmap2::Mmap;
    use std::fs::File;

    let file = File::open(path)
        .with_context(|| format!("Failed to open facts file: {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file).context("Failed to mmap facts file")? };
    let document = serde_json::from_slice(&mmap[..]).context("Failed to decode facts JSON")?;
    Ok(document)
}
