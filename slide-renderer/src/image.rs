//! Image utilities.
//!
//! Slide images travel as data URIs (`data:image/png;base64,...`). This module
//! parses and builds them, decodes them to RGBA buffers, fits slides to the
//! logical canvas, and produces thumbnails.

use base64::Engine;
use image::{ImageEncoder, RgbaImage};
use slide_core::{ImageRef, CANVAS_HEIGHT, CANVAS_WIDTH};

use crate::error::{ExportError, ExportResult};

/// Longest edge of a generated thumbnail.
pub const THUMBNAIL_MAX_SIZE: u32 = 320;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else {
            Self::Unknown
        }
    }

    /// MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// A parsed data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared MIME type (may be empty).
    pub mime: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
}

/// Parse a data URI.
///
/// Supports base64 payloads and percent-encoded payloads.
///
/// # Errors
///
/// Returns [`ExportError::DataUri`] if the URI is malformed.
pub fn parse_data_uri(uri: &str) -> ExportResult<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::DataUri("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::DataUri("missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default().to_string();
    let bytes = if metadata.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ExportError::DataUri(format!("base64: {e}")))?
    } else {
        urlencoding_decode(payload)?
    };
    Ok(DataUri { mime, bytes })
}

/// Build a base64 data URI.
#[must_use]
pub fn data_uri_from_bytes(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Simple URL decoding (percent-encoding).
fn urlencoding_decode(input: &str) -> ExportResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| ExportError::DataUri("invalid percent encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }
    Ok(result)
}

/// Decode encoded image bytes to RGBA.
///
/// # Errors
///
/// Returns [`ExportError::Image`] if the bytes are not a supported image.
pub fn load_image_from_bytes(data: &[u8]) -> ExportResult<RgbaImage> {
    image::load_from_memory(data)
        .map(|img| img.to_rgba8())
        .map_err(|e| ExportError::Image(e.to_string()))
}

/// Decode an image data URI to RGBA.
///
/// # Errors
///
/// Returns an error if the URI is malformed or the payload cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> ExportResult<RgbaImage> {
    let data = parse_data_uri(uri)?;
    load_image_from_bytes(&data.bytes)
}

/// Stretch an image to the logical canvas size (1920x1080).
///
/// Returns the image unchanged if it already has canvas size.
#[must_use]
pub fn fit_to_canvas(img: RgbaImage) -> RgbaImage {
    if img.dimensions() == (CANVAS_WIDTH, CANVAS_HEIGHT) {
        return img;
    }
    tracing::debug!(
        "Resizing {}x{} image to canvas size",
        img.width(),
        img.height()
    );
    image::imageops::resize(
        &img,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        image::imageops::FilterType::Triangle,
    )
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if encoding fails.
pub fn encode_png(img: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))?;
    Ok(buf)
}

/// Encode an RGBA image as a PNG data URI.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if encoding fails.
pub fn png_data_uri(img: &RgbaImage) -> ExportResult<ImageRef> {
    let png = encode_png(img)?;
    Ok(ImageRef::from(data_uri_from_bytes(
        ImageFormat::Png.mime_type(),
        &png,
    )))
}

/// Produce a PNG thumbnail data URI whose longest edge is at most `max_size`.
///
/// # Errors
///
/// Returns an error if the source image cannot be decoded or encoded.
pub fn generate_thumbnail(source: &ImageRef, max_size: u32) -> ExportResult<ImageRef> {
    let img = load_image_from_data_uri(source.as_str())?;
    let (width, height) = thumbnail_size(img.width(), img.height(), max_size.max(1));
    let thumb = image::imageops::thumbnail(&img, width, height);
    png_data_uri(&thumb)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn thumbnail_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width.max(1), height.max(1));
    }
    let scale = f64::from(max_size) / f64::from(width.max(height));
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.max(1), h.max(1))
}
