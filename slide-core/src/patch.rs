//! Partial element updates.

use serde::{Deserialize, Serialize};

use crate::element::{FontWeight, Geometry, ShapeKind, TextAlign};

/// A partial update merged into an element by [`Element::apply_patch`].
///
/// Every field is optional. Fields that do not apply to the target element's
/// kind are ignored, so a single patch type serves every property editor.
///
/// [`Element::apply_patch`]: crate::Element::apply_patch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    /// New x position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New y position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// New width (clamped to at least 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// New height (clamped to at least 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// New paint order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// New rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,

    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Font family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Text alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Line height multiple.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Letter spacing in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,

    /// Shape kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeKind>,
    /// Shape fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Shape border color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Shape border width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    /// Shape corner radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    /// Shape or image opacity (clamped to 0..=1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,

    /// Image source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Chart kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    /// Chart fallback image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_image: Option<String>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets position and size from a geometry.
    ///
    /// Paint order and rotation are left untouched.
    #[must_use]
    pub fn bounds(geometry: &Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            ..Self::default()
        }
    }

    /// Patch that replaces text content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Whether the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_from_partial_json() {
        let patch: ElementPatch =
            serde_json::from_str(r#"{"x": 5, "fontSize": 32}"#).expect("parse");
        assert_eq!(patch.x, Some(5.0));
        assert_eq!(patch.font_size, Some(32.0));
        assert!(patch.y.is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ElementPatch::default().is_empty());
        assert!(!ElementPatch::position(1.0, 2.0).is_empty());
        assert_eq!(serde_json::to_string(&ElementPatch::default()).expect("ser"), "{}");
    }
}
