use thiserror::Error;

/// Failure reported by a fact provider for one source file. The builder skips the file.
#[derive(Debug, Error)]
pub enum FactProviderError {
    #[error("failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("unknown source file: {0}")]
    UnknownFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FactProviderError {
    pub fn parse(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.into(),
        }
    }
}

/// Persisted snapshot data could not be turned back into a graph.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("tree node with empty signature under {parent}")]
    EmptySignature { parent: String },

    #[error("circular node {0} must not have children")]
    CircularWithChildren(String),

    #[error("tree root {signature} does not match its entry point {entry_point}")]
    RootMismatch {
        signature: String,
        entry_point: String,
    },
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Errors returned by the call graph query API.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("signature not found in call graph: {0}")]
    UnknownSignature(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl GraphError {
    pub fn is_unknown_signature(&self) -> bool {
        matches!(self, Self::UnknownSignature(_))
    }
}
