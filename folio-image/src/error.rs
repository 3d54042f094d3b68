//! Error types for the upload pipeline.

use thiserror::Error;

/// Result type for image pipeline operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while normalizing or cropping an upload.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The upload exceeds the size cap for its field class.
    #[error("file is too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Configured cap for the field class in bytes.
        limit: usize,
    },

    /// The upload's type is not accepted for its field class.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Pre-conversion of a camera-native container failed.
    #[error("image conversion failed: {0}")]
    ConversionFailed(String),

    /// The crop rectangle lies outside the source image.
    #[error("crop region lies outside the source image")]
    InvalidCropRegion,

    /// The payload could not be decoded or re-encoded.
    #[error("failed to process image: {0}")]
    Decode(String),
}
