//! In-memory image fixtures for pipeline tests.

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(image: DynamicImage, format: ImageFormat) -> Bytes {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    Bytes::from(buffer.into_inner())
}

/// RGB (no alpha channel) gradient, encoded as PNG.
pub(crate) fn opaque_png_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
}

/// Half-transparent RGBA image, encoded as PNG.
pub(crate) fn translucent_png_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 64, 100]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// RGB gradient, encoded as JPEG.
pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, 200, y as u8]));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}
