//! # Folio Image
//!
//! The upload pipeline for Folio content images: gate an uploaded file
//! by size and type, decode it into a normalized bitmap (pre-converting
//! camera-native containers through a pluggable strategy), then render a
//! user-chosen crop into a fixed-size embeddable payload.
//!
//! ```text
//! upload bytes ──> ImageCodec ──> NormalizedImage ──> CropTransform ──> data URI
//!                  size cap        Photo(Bitmap)       square render
//!                  type gate       Document(payload)   deterministic
//!                  HEIC convert                        encode
//! ```
//!
//! Documents (PDF resumes) skip the crop stage entirely and embed as a
//! data payload straight from the codec.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod convert;
pub mod crop;
pub mod error;

pub use codec::{Bitmap, FieldClass, ImageCodec, NormalizedImage};
pub use convert::{ConverterProvider, ImageFormatConverter, UnsupportedConverter};
pub use crop::{CropRect, OUTPUT_SIZE};
pub use error::{ImageError, ImageResult};

/// Folio image pipeline version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
