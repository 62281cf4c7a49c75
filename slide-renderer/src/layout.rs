//! Layout rules shared by the raster and HTML exporters.
//!
//! Both exporters must place and style elements identically, so the box
//! model constants and source-resolution rules live here.

use slide_core::{ImageRef, SceneDocument};

/// Inner padding of a text box in pixels.
pub const TEXT_PADDING: f32 = 4.0;

/// Line height multiple used when a text element has none.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.4;

/// Fill of the image placeholder block.
pub const IMAGE_PLACEHOLDER_FILL: &str = "#f0f0f0";

/// Dashed border color of the image placeholder block.
pub const IMAGE_PLACEHOLDER_BORDER: &str = "#ccc";

/// Label color of the image placeholder block.
pub const IMAGE_PLACEHOLDER_TEXT: &str = "#999";

/// Fill of the chart placeholder block.
pub const CHART_PLACEHOLDER_FILL: &str = "#f5f5f5";

/// Border color of the chart placeholder block.
pub const CHART_PLACEHOLDER_BORDER: &str = "#ddd";

/// Label color of the chart placeholder block.
pub const CHART_PLACEHOLDER_TEXT: &str = "#666";

/// Where an image element gets its pixels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// The element's own bitmap.
    Own(&'a str),
    /// The region of the original slide under the element.
    Crop(&'a ImageRef),
    /// Nothing to show; draw a labeled placeholder.
    Placeholder,
}

/// Resolve the pixels of an image element with source `src`.
///
/// Empty sources and sources naming a placeholder fall back to cropping the
/// document's original slide, and to a placeholder block without one.
#[must_use]
pub fn resolve_image_source<'a>(src: &'a str, document: &'a SceneDocument) -> ImageSource<'a> {
    if !src.trim().is_empty() && !src.contains("placeholder") {
        ImageSource::Own(src)
    } else if let Some(original) = document.original_image() {
        ImageSource::Crop(original)
    } else {
        ImageSource::Placeholder
    }
}

/// Label shown on a chart without a fallback image.
#[must_use]
pub fn chart_label(chart_type: &str) -> String {
    format!("{} Chart", chart_type.to_uppercase())
}

/// Line height in pixels for a font size and optional multiple.
#[must_use]
pub fn line_height_px(font_size: f32, line_height: Option<f32>) -> f32 {
    font_size * line_height.unwrap_or(DEFAULT_LINE_HEIGHT)
}
