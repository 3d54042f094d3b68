//! Deterministic square crop to an embeddable payload.
//!
//! The interaction layer supplies a crop rectangle in source pixels
//! (already clamped while the user drags and zooms); the transform
//! re-validates it, renders the region into a fixed-size square, and
//! encodes the result as a base64 data URI suitable for direct storage
//! in a text field.

use base64::Engine;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::codec::Bitmap;
use crate::error::{ImageError, ImageResult};

/// Edge length in pixels of the rendered square output.
pub const OUTPUT_SIZE: u32 = 512;

/// JPEG quality of the encoded payload.
const OUTPUT_QUALITY: u8 = 80;

/// A crop rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// The largest centered square region at the given zoom factor.
    ///
    /// Mirrors the drag/zoom gesture math of the interaction layer: zoom
    /// 1.0 selects the full centered square, higher zoom narrows it.
    /// Zoom values below 1.0 are clamped to 1.0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn centered_with_zoom(source_width: u32, source_height: u32, zoom: f32) -> Self {
        let zoom = if zoom < 1.0 { 1.0 } else { zoom };
        let full = source_width.min(source_height);
        let side = ((full as f32) / zoom) as u32;
        let side = side.clamp(1, full.max(1));
        Self {
            x: (source_width.saturating_sub(side)) / 2,
            y: (source_height.saturating_sub(side)) / 2,
            width: side,
            height: side,
        }
    }

    /// Whether this rectangle is non-empty and lies within the bounds.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|r| r <= height)
    }
}

/// Render `rect` of `bitmap` into a fixed-size square data URI.
///
/// Pure and stateless: the same bitmap and rectangle always produce a
/// byte-identical payload.
///
/// # Errors
///
/// Returns [`ImageError::InvalidCropRegion`] when the rectangle is empty
/// or lies outside the bitmap, or [`ImageError::Decode`] when the bitmap
/// buffer is inconsistent or the output fails to encode.
pub fn apply(bitmap: &Bitmap, rect: CropRect) -> ImageResult<String> {
    if !rect.fits_within(bitmap.width, bitmap.height) {
        return Err(ImageError::InvalidCropRegion);
    }

    let source = image::RgbaImage::from_raw(bitmap.width, bitmap.height, bitmap.data.clone())
        .ok_or_else(|| ImageError::Decode("bitmap buffer does not match its dimensions".to_string()))?;

    let region = imageops::crop_imm(&source, rect.x, rect.y, rect.width, rect.height).to_image();
    let resized = imageops::resize(&region, OUTPUT_SIZE, OUTPUT_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = image::DynamicImage::ImageRgba8(resized).to_rgb8();
    let mut encoded = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, OUTPUT_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&encoded)
    ))
}
