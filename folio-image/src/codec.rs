//! Upload gating and decoding.
//!
//! Checks run in a fixed order: size cap, then type allowlist, then
//! decode. An oversized or mistyped upload never reaches the decoder.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::convert::{ConverterProvider, ImageFormatConverter, UnsupportedConverter};
use crate::error::{ImageError, ImageResult};

/// Which kind of field an upload is destined for.
///
/// Each class carries its own size cap and accepted-type allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Photo fields (profile picture, project thumbnails).
    Photo,
    /// Document fields (PDF resumes).
    Document,
}

impl FieldClass {
    /// Maximum accepted upload size in bytes.
    #[must_use]
    pub const fn max_bytes(self) -> usize {
        match self {
            Self::Photo => 5 * 1024 * 1024,
            Self::Document => 2 * 1024 * 1024,
        }
    }
}

/// Decoded RGBA bitmap ready for the crop stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
}

/// Result of normalizing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedImage {
    /// A raster photo, decoded and awaiting the crop stage.
    Photo(Bitmap),
    /// A document embedded directly as a data payload; skips cropping.
    Document {
        /// The embeddable `data:application/pdf;base64,…` payload.
        data_uri: String,
    },
}

/// Decodes uploads into normalized payloads.
pub struct ImageCodec {
    provider: Arc<dyn ConverterProvider>,
    converter: OnceCell<Arc<dyn ImageFormatConverter>>,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec {
    /// Create a codec without a HEIC conversion capability.
    #[must_use]
    pub fn new() -> Self {
        Self::with_converter_provider(Arc::new(UnsupportedConverter))
    }

    /// Create a codec with an injected conversion capability.
    #[must_use]
    pub fn with_converter_provider(provider: Arc<dyn ConverterProvider>) -> Self {
        Self {
            provider,
            converter: OnceCell::new(),
        }
    }

    /// Normalize an uploaded file.
    ///
    /// # Errors
    ///
    /// - [`ImageError::FileTooLarge`] before any decoding work when the
    ///   upload exceeds the class cap.
    /// - [`ImageError::UnsupportedFileType`] when the declared MIME type
    ///   and file name match nothing the class accepts.
    /// - [`ImageError::ConversionFailed`] when a HEIC upload cannot be
    ///   pre-converted.
    /// - [`ImageError::Decode`] when the payload fails to decode.
    pub async fn decode(
        &self,
        bytes: &[u8],
        declared_mime: &str,
        file_name: &str,
        class: FieldClass,
    ) -> ImageResult<NormalizedImage> {
        let limit = class.max_bytes();
        if bytes.len() > limit {
            return Err(ImageError::FileTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        match class {
            FieldClass::Document => {
                if !is_pdf(declared_mime, file_name) {
                    return Err(ImageError::UnsupportedFileType(describe(
                        declared_mime,
                        file_name,
                    )));
                }
                Ok(NormalizedImage::Document {
                    data_uri: encode_data_uri("application/pdf", bytes),
                })
            }
            FieldClass::Photo => {
                if is_heic(declared_mime, file_name) {
                    let converted = self.convert_heic(bytes).await?;
                    return decode_bitmap(&converted).map(NormalizedImage::Photo);
                }
                if !is_allowed_photo(declared_mime, file_name) {
                    return Err(ImageError::UnsupportedFileType(describe(
                        declared_mime,
                        file_name,
                    )));
                }
                decode_bitmap(bytes).map(NormalizedImage::Photo)
            }
        }
    }

    /// Pre-convert a HEIC payload through the memoized converter.
    async fn convert_heic(&self, bytes: &[u8]) -> ImageResult<Vec<u8>> {
        tracing::debug!("converting HEIC upload");
        let converter = self
            .converter
            .get_or_try_init(|| self.provider.acquire())
            .await?;
        converter.convert(bytes).await
    }
}

/// Decode raw bytes into an RGBA bitmap.
fn decode_bitmap(bytes: &[u8]) -> ImageResult<Bitmap> {
    let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Bitmap {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Encode bytes as a base64 data URI with the given MIME type.
fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine;
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn is_pdf(mime: &str, file_name: &str) -> bool {
    mime.eq_ignore_ascii_case("application/pdf") || extension(file_name) == "pdf"
}

fn is_heic(mime: &str, file_name: &str) -> bool {
    matches!(
        mime.to_lowercase().as_str(),
        "image/heic" | "image/heif"
    ) || matches!(extension(file_name).as_str(), "heic" | "heif")
}

fn is_allowed_photo(mime: &str, file_name: &str) -> bool {
    match mime.to_lowercase().as_str() {
        "image/png" | "image/jpeg" | "image/jpg" | "image/webp" | "image/gif" => true,
        // Browsers sometimes omit or generalize the type; fall back to
        // the extension.
        "" | "application/octet-stream" => matches!(
            extension(file_name).as_str(),
            "png" | "jpg" | "jpeg" | "webp" | "gif"
        ),
        _ => false,
    }
}

fn describe(mime: &str, file_name: &str) -> String {
    if mime.is_empty() {
        file_name.to_string()
    } else {
        mime.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A tiny valid PNG produced through the image crate.
    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .expect("encode test png");
        bytes
    }

    #[tokio::test]
    async fn test_oversized_photo_never_reaches_decode() {
        let codec = ImageCodec::new();
        // Garbage payload: if decoding ran it would fail differently.
        let oversized = vec![0_u8; FieldClass::Photo.max_bytes() + 1];
        let result = codec
            .decode(&oversized, "image/png", "huge.png", FieldClass::Photo)
            .await;
        assert!(matches!(result, Err(ImageError::FileTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_document_cap_is_smaller_than_photo_cap() {
        let codec = ImageCodec::new();
        let size = FieldClass::Document.max_bytes() + 1;
        let payload = vec![0_u8; size];
        let result = codec
            .decode(&payload, "application/pdf", "resume.pdf", FieldClass::Document)
            .await;
        assert!(matches!(
            result,
            Err(ImageError::FileTooLarge { limit, .. }) if limit == FieldClass::Document.max_bytes()
        ));
    }

    #[tokio::test]
    async fn test_wrong_mime_rejected_before_decode() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(b"not an image", "text/plain", "notes.txt", FieldClass::Photo)
            .await;
        assert!(matches!(result, Err(ImageError::UnsupportedFileType(_))));
    }

    #[tokio::test]
    async fn test_document_class_only_accepts_pdf() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(&tiny_png(), "image/png", "photo.png", FieldClass::Document)
            .await;
        assert!(matches!(result, Err(ImageError::UnsupportedFileType(_))));
    }

    #[tokio::test]
    async fn test_pdf_embeds_as_data_uri_without_cropping() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(b"%PDF-1.4 fake", "application/pdf", "resume.pdf", FieldClass::Document)
            .await
            .expect("decode");
        match result {
            NormalizedImage::Document { data_uri } => {
                assert!(data_uri.starts_with("data:application/pdf;base64,"));
            }
            NormalizedImage::Photo(_) => panic!("documents must not enter the photo path"),
        }
    }

    #[tokio::test]
    async fn test_valid_png_decodes_to_bitmap() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(&tiny_png(), "image/png", "avatar.png", FieldClass::Photo)
            .await
            .expect("decode");
        match result {
            NormalizedImage::Photo(bitmap) => {
                assert_eq!(bitmap.width, 4);
                assert_eq!(bitmap.height, 3);
                assert_eq!(bitmap.data.len(), 4 * 3 * 4);
            }
            NormalizedImage::Document { .. } => panic!("photos must not embed as documents"),
        }
    }

    #[tokio::test]
    async fn test_octet_stream_falls_back_to_extension() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(
                &tiny_png(),
                "application/octet-stream",
                "avatar.png",
                FieldClass::Photo,
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_heic_without_converter_fails_conversion() {
        let codec = ImageCodec::new();
        let result = codec
            .decode(b"heic bytes", "image/heic", "photo.heic", FieldClass::Photo)
            .await;
        assert!(matches!(result, Err(ImageError::ConversionFailed(_))));
    }

    /// Converter that answers with a valid PNG and counts acquisitions.
    struct CountingProvider {
        acquisitions: AtomicUsize,
    }

    struct PngConverter;

    #[async_trait]
    impl ImageFormatConverter for PngConverter {
        async fn convert(&self, _bytes: &[u8]) -> ImageResult<Vec<u8>> {
            Ok(tiny_png())
        }
    }

    #[async_trait]
    impl ConverterProvider for CountingProvider {
        async fn acquire(&self) -> ImageResult<Arc<dyn ImageFormatConverter>> {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(PngConverter))
        }
    }

    #[tokio::test]
    async fn test_heic_converts_then_decodes() {
        let provider = Arc::new(CountingProvider {
            acquisitions: AtomicUsize::new(0),
        });
        let codec = ImageCodec::with_converter_provider(Arc::clone(&provider) as Arc<dyn ConverterProvider>);

        let result = codec
            .decode(b"heic bytes", "image/heic", "photo.HEIC", FieldClass::Photo)
            .await
            .expect("decode");
        assert!(matches!(result, NormalizedImage::Photo(_)));
        assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_heic_uploads_acquire_once() {
        let provider = Arc::new(CountingProvider {
            acquisitions: AtomicUsize::new(0),
        });
        let codec = ImageCodec::with_converter_provider(Arc::clone(&provider) as Arc<dyn ConverterProvider>);

        let (a, b) = tokio::join!(
            codec.decode(b"first", "image/heic", "a.heic", FieldClass::Photo),
            codec.decode(b"second", "image/heic", "b.heic", FieldClass::Photo),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(
            provider.acquisitions.load(Ordering::SeqCst),
            1,
            "concurrent first uses must not acquire twice"
        );
    }
}
