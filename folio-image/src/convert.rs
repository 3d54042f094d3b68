//! Pluggable pre-conversion for camera-native image containers.
//!
//! HEIC uploads cannot be decoded directly; they are first converted to
//! a standard raster payload through an [`ImageFormatConverter`]. The
//! converter is a capability injected into the codec via a
//! [`ConverterProvider`] and acquired lazily, at most once per codec.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ImageError, ImageResult};

/// Converts a camera-native container into a standard raster payload.
#[async_trait]
pub trait ImageFormatConverter: Send + Sync {
    /// Convert `bytes` into a decodable raster payload (JPEG).
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ConversionFailed`] when the payload cannot
    /// be converted.
    async fn convert(&self, bytes: &[u8]) -> ImageResult<Vec<u8>>;
}

/// Supplies the converter capability on first use.
///
/// Acquisition may itself be asynchronous and expensive (loading an
/// external conversion library, for instance); the codec memoizes the
/// result so concurrent first uses acquire exactly once.
#[async_trait]
pub trait ConverterProvider: Send + Sync {
    /// Acquire the converter.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ConversionFailed`] when the capability is
    /// unavailable; the codec surfaces this per upload and will retry
    /// acquisition on the next conversion attempt.
    async fn acquire(&self) -> ImageResult<Arc<dyn ImageFormatConverter>>;
}

/// Default converter used when no conversion capability is configured.
///
/// Every conversion fails with [`ImageError::ConversionFailed`], so
/// HEIC uploads are rejected cleanly instead of crashing the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedConverter;

#[async_trait]
impl ImageFormatConverter for UnsupportedConverter {
    async fn convert(&self, _bytes: &[u8]) -> ImageResult<Vec<u8>> {
        Err(ImageError::ConversionFailed(
            "HEIC conversion is not available in this build".to_string(),
        ))
    }
}

#[async_trait]
impl ConverterProvider for UnsupportedConverter {
    async fn acquire(&self) -> ImageResult<Arc<dyn ImageFormatConverter>> {
        Ok(Arc::new(Self))
    }
}
