//! Materialize-then-analyze pipeline for a record set.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::Attachment;
use crate::domain::errors::IngestError;
use crate::infrastructure::analyzers::AttachmentAnalyzer;
use crate::infrastructure::media::AttachmentDownloader;

/// Downloads a submission's files and attaches format metadata.
#[derive(Clone)]
pub struct ProcessAttachmentsUseCase {
    downloader: Arc<AttachmentDownloader>,
    analyzer: Arc<AttachmentAnalyzer>,
}

impl ProcessAttachmentsUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(downloader: Arc<AttachmentDownloader>, analyzer: Arc<AttachmentAnalyzer>) -> Self {
        Self {
            downloader,
            analyzer,
        }
    }

    /// Materializes `records` under `dir` and analyzes them.
    ///
    /// Analysis only starts once every download has finished, so no analyzer
    /// observes a partial file.
    ///
    /// # Errors
    /// Returns error if refreshing or downloading fails. Format problems are
    /// recorded on the records instead.
    pub async fn execute(
        &self,
        records: &mut [Attachment],
        dir: &Path,
        prune: bool,
    ) -> Result<(), IngestError> {
        debug!(count = records.len(), dir = %dir.display(), "Processing attachments");

        self.downloader.materialize(records, dir, prune).await?;
        self.analyzer.analyze(records, dir).await;

        info!(
            count = records.len(),
            with_metadata = records.iter().filter(|r| r.metadata().is_some()).count(),
            "Processed attachments"
        );
        Ok(())
    }
}
