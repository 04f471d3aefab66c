//! Port for oEmbed-style video lookups.

use async_trait::async_trait;

use crate::domain::entities::VideoMeta;
use crate::domain::errors::TransportError;

/// Port for fetching details of a linked video.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoMetadataPort: Send + Sync {
    /// Looks up `url` and returns its details with fallbacks applied.
    async fn fetch_video_metadata(&self, url: &str) -> Result<VideoMeta, TransportError>;
}
