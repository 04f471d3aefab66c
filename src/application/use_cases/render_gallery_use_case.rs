//! Gallery asset rendering.

use std::path::PathBuf;

use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::domain::services::{GalleryLayout, LayoutMode};
use crate::infrastructure::media::ImageNormalizer;

/// Renders one gallery cell per processed image.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderGalleryUseCase {
    mode: LayoutMode,
}

impl RenderGalleryUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(mode: LayoutMode) -> Self {
        Self { mode }
    }

    /// Renders every image concurrently.
    ///
    /// Returns the rendered paths in input order. Images that fail to render
    /// are logged and left out.
    pub async fn execute(&self, images: &[PathBuf]) -> Vec<PathBuf> {
        let count = images.len();
        let mut tasks = JoinSet::new();

        for (index, source) in images.iter().cloned().enumerate() {
            let geometry = GalleryLayout::compute(count, index, self.mode);
            tasks.spawn_blocking(move || {
                let result = ImageNormalizer::render_gallery_cell(&source, &geometry);
                (index, source, result)
            });
        }

        let mut rendered: Vec<(usize, PathBuf)> = Vec::with_capacity(count);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(path))) => rendered.push((index, path)),
                Ok((_, source, Err(e))) => {
                    warn!(path = %source.display(), error = %e, "Failed to render gallery image");
                }
                Err(e) => error!(error = %e, "Render task panicked"),
            }
        }
        rendered.sort_by_key(|(index, _)| *index);

        info!(requested = count, rendered = rendered.len(), mode = ?self.mode, "Rendered gallery");
        rendered.into_iter().map(|(_, path)| path).collect()
    }
}
