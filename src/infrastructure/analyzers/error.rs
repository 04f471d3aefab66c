use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::infrastructure::archive::ArchiveError;
use crate::infrastructure::nbt::NbtError;

/// Result alias for format analysis.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failures while reading a submission file.
///
/// These never abort a batch; analyzers turn them into `Failed` metadata.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AnalysisError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("malformed NBT: {0}")]
    Nbt(#[from] NbtError),

    #[error("{0}")]
    Format(String),

    #[error("invalid version table {path}: {source}")]
    VersionTable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    /// Creates I/O error for `path`.
    #[must_use]
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates version table error.
    #[must_use]
    pub fn version_table(path: &Path, source: serde_json::Error) -> Self {
        Self::VersionTable {
            path: path.to_path_buf(),
            source,
        }
    }
}
