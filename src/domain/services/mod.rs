//! Pure domain services.

mod file_key;
mod gallery_layout;

pub use file_key::file_key;
pub use gallery_layout::{
    BASE_HEIGHT, BASE_WIDTH, CellGeometry, GUTTER, GalleryLayout, LayoutMode, TARGET_SIZE,
    VERTICAL_PADDING,
};
