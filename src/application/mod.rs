//! Application layer with text services and use cases.

/// Reference extraction and link renewal.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use use_cases::{
    CollectAttachmentsUseCase, DEFAULT_SYSTEM_AUTHOR_ID, ProcessAttachmentsUseCase,
    ProcessImagesUseCase, RenderGalleryUseCase,
};
