//! Error taxonomy for an export run.
//!
//! `Discovery` and `IndexWrite` are fatal for the whole run. The remaining
//! variants belong to a single rule and are either fatal (`abort` policy) or
//! recorded as a failure (`skip` policy) by the orchestrator.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("cannot read source tree {}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("cannot read metadata {}", path.display())]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON metadata in {}", path.display())]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("metadata in {} is not a JSON object", path.display())]
    MetadataNotObject { path: PathBuf },
    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot extract terms from {}", path.display())]
    TermExtraction {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write index {}", path.display())]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// File the error is about.
    pub fn path(&self) -> &Path {
        match self {
            ExportError::Discovery { path, .. }
            | ExportError::MetadataRead { path, .. }
            | ExportError::MetadataParse { path, .. }
            | ExportError::MetadataNotObject { path }
            | ExportError::Write { path, .. }
            | ExportError::TermExtraction { path, .. }
            | ExportError::IndexWrite { path, .. } => path,
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
