//! Cell geometry for fixed-layout image galleries.
//!
//! Discord lays out up to four embed images in a fixed grid. Images are sized
//! to their cell up front so the client does not crop them.

/// Width of the full gallery area before scaling.
pub const BASE_WIDTH: u32 = 386 * 2;
/// Height of the full gallery area before scaling.
pub const BASE_HEIGHT: u32 = 258 * 2;
/// Space between neighbouring cells.
pub const GUTTER: u32 = 15;
/// Transparent rows added under one- and two-image layouts.
pub const VERTICAL_PADDING: u32 = 60;
/// Length of the longer output side.
pub const TARGET_SIZE: u32 = 800;

/// How a set of images is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Images share one grid.
    #[default]
    Gallery,
    /// Every image is shown on its own in a square.
    Full,
}

/// Target size for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    /// Cell width before scaling.
    pub cell_width: u32,
    /// Cell height before scaling, padding excluded.
    pub cell_height: u32,
    /// Bottom padding before scaling.
    pub cell_padding: u32,
    /// Scaled width of the image box.
    pub width: u32,
    /// Scaled height of the image box.
    pub height: u32,
    /// Scaled transparent rows below the image box.
    pub bottom_padding: u32,
}

impl CellGeometry {
    /// Height of the encoded output, padding included.
    #[must_use]
    pub const fn canvas_height(&self) -> u32 {
        self.height + self.bottom_padding
    }
}

/// Computes per-image cell sizes.
pub struct GalleryLayout;

impl GalleryLayout {
    /// Returns the geometry for image `index` out of `count`.
    #[must_use]
    pub fn compute(count: usize, index: usize, mode: LayoutMode) -> CellGeometry {
        let mut width = BASE_WIDTH;
        let mut height = BASE_HEIGHT;
        let mut padding = 0;

        match mode {
            LayoutMode::Full => {
                width = TARGET_SIZE;
                height = TARGET_SIZE;
            }
            LayoutMode::Gallery => match count {
                0 | 1 => {
                    padding = VERTICAL_PADDING;
                    height -= padding;
                }
                2 => {
                    width = BASE_WIDTH / 2 - GUTTER;
                    padding = VERTICAL_PADDING;
                    height -= padding;
                }
                3 if index == 0 => {
                    width = 2 * (BASE_WIDTH / 3) - GUTTER;
                }
                3 => {
                    width = BASE_WIDTH / 3 - GUTTER;
                    height = BASE_HEIGHT / 2 - GUTTER;
                }
                _ => {}
            },
        }

        let longest = width.max(height);
        let (scaled_width, scaled_height) = if width > height {
            (TARGET_SIZE, scale(height, longest))
        } else {
            (scale(width, longest), TARGET_SIZE)
        };

        CellGeometry {
            cell_width: width,
            cell_height: height,
            cell_padding: padding,
            width: scaled_width,
            height: scaled_height,
            bottom_padding: scale(padding, longest),
        }
    }
}

/// Scales `value` by `TARGET_SIZE / longest`, rounding down.
fn scale(value: u32, longest: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(TARGET_SIZE) / u64::from(longest.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
