//! Raster buffers exchanged between renderers, the overlay and the output page.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};

use crate::error::{Result, VellumError};

/// An RGB, row-major page raster.
pub type RasterImage = RgbImage;

/// Largest raster, in bytes, a page may be rendered to.
pub const MAX_RASTER_BYTES: usize = 1 << 30;

/// Creates a white raster of the given size.
pub fn blank(width: u32, height: u32) -> RasterImage {
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

/// Resamples `image` to exactly `width` x `height`, returning it untouched if
/// it already has that size.
pub fn resample(image: RasterImage, width: u32, height: u32) -> RasterImage {
    if image.dimensions() == (width, height) {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Triangle)
}

/// Encodes a raster as PNG bytes.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Decodes PNG bytes into an RGB raster.
pub fn decode_png(bytes: &[u8]) -> Result<RasterImage> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgb8())
}

/// Pixel size of a page of `width` x `height` units rendered at the given scale.
///
/// Always at least one pixel in each direction. Fails if the RGB buffer would
/// exceed [`MAX_RASTER_BYTES`].
pub fn scaled_size(width: f64, height: f64, scale_x: f64, scale_y: f64) -> Result<(u32, u32)> {
    let px = |v: f64| v.round().max(1.0);
    let (w, h) = (px(width * scale_x), px(height * scale_y));
    let too_large = || VellumError::Render(format!("raster of {w}x{h} pixels is too large"));

    let limit = f64::from(u32::MAX);
    if !(w.is_finite() && h.is_finite()) || w > limit || h > limit {
        return Err(too_large());
    }
    let (w_px, h_px) = (w as u32, h as u32);
    let bytes = usize::try_from(w_px)
        .ok()
        .zip(usize::try_from(h_px).ok())
        .and_then(|(w, h)| w.checked_mul(h))
        .and_then(|n| n.checked_mul(3));
    match bytes {
        Some(n) if n <= MAX_RASTER_BYTES => Ok((w_px, h_px)),
        _ => Err(too_large()),
    }
}
