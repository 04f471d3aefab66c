//! Image cleanup and gallery cell rendering.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageResult, RgbaImage};
use tracing::{debug, trace};

use crate::domain::services::{CellGeometry, TARGET_SIZE};

/// Suffix appended to a processed image when rendering its gallery cell.
pub const GALLERY_SUFFIX: &str = ".discord.png";

/// PNG produced by [`ImageNormalizer::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Encoded PNG bytes.
    pub bytes: Vec<u8>,
    /// Final width.
    pub width: u32,
    /// Final height.
    pub height: u32,
}

/// Stateless image transforms backed by the `image` crate.
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Trims transparent borders, shrinks to fit the target box and encodes
    /// as PNG. Images are never enlarged.
    ///
    /// # Errors
    /// Returns error if the bytes cannot be decoded or the PNG encoding fails.
    pub fn normalize(bytes: &[u8]) -> ImageResult<NormalizedImage> {
        let mut image = image::load_from_memory(bytes)?;

        if !is_opaque(&image) {
            image = trim_transparent(image);
        }

        let (width, height) = image.dimensions();
        if width > TARGET_SIZE || height > TARGET_SIZE {
            image = image.resize(TARGET_SIZE, TARGET_SIZE, FilterType::Lanczos3);
        }

        let (width, height) = image.dimensions();
        trace!(width, height, "Normalized image");

        Ok(NormalizedImage {
            bytes: encode_png(&image)?,
            width,
            height,
        })
    }

    /// Renders `source` into its gallery cell and writes `{source}.discord.png`.
    ///
    /// The image is fitted inside the cell without upscaling, centred on a
    /// transparent canvas of exactly the cell size, and followed by the
    /// cell's transparent bottom padding.
    ///
    /// # Errors
    /// Returns error if the source cannot be decoded or the output written.
    pub fn render_gallery_cell(source: &Path, geometry: &CellGeometry) -> ImageResult<PathBuf> {
        let image = image::open(source)?;
        let canvas = compose_cell(&image, geometry);

        let mut output = source.as_os_str().to_os_string();
        output.push(GALLERY_SUFFIX);
        let output = PathBuf::from(output);

        canvas.save_with_format(&output, ImageFormat::Png)?;
        debug!(path = %output.display(), width = canvas.width(), height = canvas.height(), "Rendered gallery cell");

        Ok(output)
    }
}

fn is_opaque(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return true;
    }
    image.to_rgba8().pixels().all(|p| p[3] == u8::MAX)
}

/// Crops to the bounding box of pixels that are not fully transparent.
fn trim_transparent(image: DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();

    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    match bounds {
        Some((min_x, min_y, max_x, max_y)) => {
            image.crop_imm(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
        }
        None => image,
    }
}

fn compose_cell(image: &DynamicImage, geometry: &CellGeometry) -> RgbaImage {
    let (box_width, box_height) = (geometry.width.max(1), geometry.height.max(1));
    let (width, height) = image.dimensions();

    let fitted = if width > box_width || height > box_height {
        image.resize(box_width, box_height, FilterType::Lanczos3)
    } else {
        image.clone()
    };

    let mut canvas = RgbaImage::new(box_width, box_height + geometry.bottom_padding);
    let x = (box_width - fitted.width().min(box_width)) / 2;
    let y = (box_height - fitted.height().min(box_height)) / 2;
    imageops::overlay(&mut canvas, &fitted.to_rgba8(), i64::from(x), i64::from(y));

    canvas
}

fn encode_png(image: &DynamicImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
