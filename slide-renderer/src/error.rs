//! Renderer error types.

use thiserror::Error;

/// Result type for export and image operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting or processing slide images.
///
/// Export failures never touch the document being exported.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The intermediate SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterization failed.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// PNG/JPEG encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// An image could not be decoded.
    #[error("Failed to decode image: {0}")]
    Image(String),

    /// A data URI was malformed.
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    /// Document serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing an export file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
