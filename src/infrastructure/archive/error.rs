use std::io;

use thiserror::Error;

/// Result alias for archive reads.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive safety violations and container failures.
///
/// Every variant aborts the whole read; no entry is ever silently skipped.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ArchiveError {
    #[error("path traversal detected: {entry}")]
    PathTraversal { entry: String },

    #[error("entry {entry} is {size} bytes (> {limit} byte limit)")]
    EntrySizeExceeded { entry: String, size: u64, limit: u64 },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    /// Creates path traversal error.
    #[must_use]
    pub fn path_traversal(entry: impl Into<String>) -> Self {
        Self::PathTraversal {
            entry: entry.into(),
        }
    }

    /// Creates oversized entry error.
    #[must_use]
    pub fn entry_size_exceeded(entry: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::EntrySizeExceeded {
            entry: entry.into(),
            size,
            limit,
        }
    }

    /// Returns whether the archive content itself was judged hostile.
    #[must_use]
    pub const fn is_safety_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::EntrySizeExceeded { .. }
        )
    }
}
