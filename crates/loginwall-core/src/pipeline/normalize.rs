//! Canonical re-encoding: every stored object is an 8-bit PNG.
//!
//! The login-window consumer expects an alpha channel in the file regardless
//! of whether any pixel is actually transparent, so the ingest path encodes
//! with `force_alpha` set.

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use crate::error::{IngestError, IngestResult};

/// Copy a decoded image into a same-sized RGBA8 pixel grid.
///
/// Straight per-pixel copy; sources without alpha get a fully opaque channel.
pub fn normalize(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}

/// Encodes normalized images into the canonical PNG form.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalEncoder {
    force_alpha: bool,
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CanonicalEncoder {
    /// `force_alpha = false` lets fully opaque images drop to RGB8.
    pub fn new(force_alpha: bool) -> Self {
        Self { force_alpha }
    }

    pub fn forces_alpha(&self) -> bool {
        self.force_alpha
    }

    /// Normalize and encode to PNG bytes.
    pub fn encode(&self, image: &DynamicImage) -> IngestResult<Vec<u8>> {
        let rgba = normalize(image);
        let (width, height) = rgba.dimensions();

        let mut buffer = Vec::new();
        let encoder = PngEncoder::new(&mut buffer);
        let result = if self.force_alpha || !is_opaque(&rgba) {
            encoder.write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        } else {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        };
        result.map_err(|e| IngestError::Encode(e.to_string()))?;

        Ok(buffer)
    }
}

fn is_opaque(image: &RgbaImage) -> bool {
    image.pixels().all(|p| p[3] == u8::MAX)
}
