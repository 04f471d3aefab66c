//! Local materialization and image processing.

mod downloader;
mod file_store;
mod normalizer;

pub use downloader::AttachmentDownloader;
pub use file_store::FileStore;
pub use normalizer::{GALLERY_SUFFIX, ImageNormalizer, NormalizedImage};
