//! Use case implementations.

mod collect_attachments_use_case;
mod process_attachments_use_case;
mod process_images_use_case;
mod render_gallery_use_case;

pub use collect_attachments_use_case::{CollectAttachmentsUseCase, DEFAULT_SYSTEM_AUTHOR_ID};
pub use process_attachments_use_case::ProcessAttachmentsUseCase;
pub use process_images_use_case::ProcessImagesUseCase;
pub use render_gallery_use_case::RenderGalleryUseCase;
