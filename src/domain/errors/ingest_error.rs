//! Errors surfaced by the ingestion pipeline.

use thiserror::Error;

use super::TransportError;

/// Remediation shown to users when fetching a file fails.
pub const REUPLOAD_HINT: &str = "try reuploading the file directly to the thread";

/// Pipeline error variants.
///
/// Format content problems never appear here; they are recorded on the
/// attachment as metadata instead.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum IngestError {
    #[error("failed to refresh attachment URLs, {hint}. Error: {source}", hint = REUPLOAD_HINT)]
    RefreshFailed {
        #[source]
        source: TransportError,
    },

    #[error("failed to download {name} at {url}, {hint}. Error: {source}", hint = REUPLOAD_HINT)]
    DownloadFailed {
        name: String,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to fetch message history: {0}")]
    History(#[source] TransportError),

    #[error("filesystem error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("background task failed: {message}")]
    Task { message: String },
}

impl IngestError {
    /// Creates refresh failure.
    #[must_use]
    pub const fn refresh_failed(source: TransportError) -> Self {
        Self::RefreshFailed { source }
    }

    /// Creates download failure naming the affected record.
    #[must_use]
    pub fn download_failed(
        name: impl Into<String>,
        url: impl Into<String>,
        source: TransportError,
    ) -> Self {
        Self::DownloadFailed {
            name: name.into(),
            url: url.into(),
            source,
        }
    }

    /// Creates filesystem error for `path`.
    #[must_use]
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates task failure.
    #[must_use]
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }
}
