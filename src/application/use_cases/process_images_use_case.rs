//! Image download and normalization.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::domain::entities::Image;
use crate::domain::errors::IngestError;
use crate::infrastructure::media::AttachmentDownloader;

/// Turns submission images into trimmed, size-capped PNGs.
#[derive(Clone)]
pub struct ProcessImagesUseCase {
    downloader: Arc<AttachmentDownloader>,
    staging_dir: PathBuf,
    processed_dir: PathBuf,
}

impl ProcessImagesUseCase {
    /// Creates new use case writing raw downloads to `staging_dir` and
    /// results to `processed_dir`.
    #[must_use]
    pub fn new(
        downloader: Arc<AttachmentDownloader>,
        staging_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            staging_dir: staging_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    /// Processes `images` in place, setting path and dimensions on success.
    ///
    /// # Errors
    /// Returns error if refreshing or downloading fails.
    pub async fn execute(&self, images: &mut [Image]) -> Result<(), IngestError> {
        self.downloader
            .process_images(images, &self.staging_dir, &self.processed_dir)
            .await?;

        info!(
            total = images.len(),
            processed = images.iter().filter(|i| i.path().is_some()).count(),
            "Processed images"
        );
        Ok(())
    }
}
