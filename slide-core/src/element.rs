//! Slide elements - the typed, positioned building blocks of a scene document.
//!
//! The JSON shape of an element is flat: common geometry fields sit next to
//! the `type` tag and the type-specific attributes.
//!
//! ```json
//! { "id": "elem_1", "type": "text", "x": 100, "y": 200, "width": 500,
//!   "height": 60, "zIndex": 5, "content": "Title", "fontSize": 48 }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::patch::ElementPatch;

/// Unique identifier for an element within one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create an ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, random element ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("elem_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Position, size and paint order of an element, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    /// X position of the top-left corner.
    pub x: f32,
    /// Y position of the top-left corner.
    pub y: f32,
    /// Width in pixels (at least 1).
    pub width: f32,
    /// Height in pixels (at least 1).
    pub height: f32,
    /// Paint order; ties are broken by document order.
    #[serde(deserialize_with = "lenient_i32")]
    pub z_index: i32,
    /// Rotation in degrees around the element center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
}

impl Geometry {
    /// Create a geometry with no rotation.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32, z_index: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            z_index,
            rotation: None,
        }
    }

    /// Right edge in canvas pixels.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge in canvas pixels.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a canvas-space point lies within the (unrotated) bounds.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Enforce the minimum size of one pixel on each axis.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.width = self.width.max(1.0);
        self.height = self.height.max(1.0);
        self
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0, 0)
    }
}

/// Font weight of a text element.
///
/// Serialized as the CSS keyword or number string the editor emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Semi-bold (600).
    #[serde(rename = "600")]
    SemiBold,
    /// The `bold` keyword.
    #[serde(rename = "bold")]
    Bold,
    /// Numeric 700 and above.
    #[serde(rename = "700")]
    Heavy,
}

impl FontWeight {
    /// CSS value for this weight.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::SemiBold => "600",
            Self::Bold => "bold",
            Self::Heavy => "700",
        }
    }

    fn from_number(weight: f64) -> Self {
        if weight >= 700.0 {
            Self::Heavy
        } else if weight >= 500.0 {
            Self::SemiBold
        } else {
            Self::Normal
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyword(String),
            Number(f64),
        }

        // Vision models are loose with weights ("Bold", 700, "800").
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from_number(n),
            Raw::Keyword(k) => match k.trim().to_ascii_lowercase().as_str() {
                "bold" | "bolder" => Self::Bold,
                "semibold" | "semi-bold" | "medium" => Self::SemiBold,
                other => other
                    .parse::<f64>()
                    .map(Self::from_number)
                    .unwrap_or(Self::Normal),
            },
        })
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    #[serde(alias = "start", alias = "justify")]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    #[serde(alias = "end")]
    Right,
}

impl TextAlign {
    /// CSS value for this alignment.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Kind of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle (optionally rounded).
    #[default]
    #[serde(alias = "rect", alias = "square")]
    Rectangle,
    /// Circle inscribed in the bounds.
    Circle,
    /// Ellipse inscribed in the bounds.
    #[serde(alias = "oval")]
    Ellipse,
    /// Free polygon; drawn as its bounding block.
    #[serde(alias = "triangle")]
    Polygon,
}

impl ShapeKind {
    /// Whether the shape is drawn with fully rounded corners.
    #[must_use]
    pub const fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }
}

/// The type-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    /// A block of (possibly multi-line) text.
    Text {
        /// Text content.
        #[serde(default)]
        content: String,
        /// Font size in pixels.
        #[serde(default = "default_font_size")]
        font_size: f32,
        /// CSS font family.
        #[serde(default = "default_font_family")]
        font_family: String,
        /// Font weight.
        #[serde(default)]
        font_weight: FontWeight,
        /// Text color as hex.
        #[serde(default = "default_text_color")]
        color: String,
        /// Horizontal alignment.
        #[serde(default)]
        text_align: TextAlign,
        /// Line height as a multiple of the font size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_height: Option<f32>,
        /// Extra spacing between letters in pixels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        letter_spacing: Option<f32>,
    },

    /// A filled (and optionally bordered) shape.
    Shape {
        /// Shape kind.
        #[serde(default)]
        shape_type: ShapeKind,
        /// Fill color as hex.
        #[serde(default = "default_shape_color")]
        background_color: String,
        /// Border color as hex.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_color: Option<String>,
        /// Border width in pixels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_width: Option<f32>,
        /// Corner radius in pixels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border_radius: Option<f32>,
        /// Opacity from 0 to 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f32>,
    },

    /// A bitmap region.
    ///
    /// An empty `src` means "crop the original slide at this element's
    /// geometry" rather than an independent bitmap.
    Image {
        /// Image URI or data URI, possibly empty.
        #[serde(default)]
        src: String,
        /// Opacity from 0 to 1.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f32>,
    },

    /// A chart. Charts are never re-rendered from data.
    Chart {
        /// Chart kind (bar, pie, line, donut, custom).
        #[serde(default = "default_chart_type")]
        chart_type: String,
        /// Flattened image of the chart.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback_image: Option<String>,
    },
}

impl ElementKind {
    /// The `type` tag of this kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Shape { .. } => "shape",
            Self::Image { .. } => "image",
            Self::Chart { .. } => "chart",
        }
    }
}

fn default_font_size() -> f32 {
    24.0
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

fn default_shape_color() -> String {
    "transparent".to_string()
}

fn default_chart_type() -> String {
    "custom".to_string()
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

/// A slide element: identity, geometry and typed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier within the owning document.
    pub id: ElementId,
    /// Position, size, paint order and rotation.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Type-specific content.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, geometry: Geometry, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.normalized(),
            kind,
        }
    }

    /// Create a text element with default styling.
    #[must_use]
    pub fn text(id: impl Into<ElementId>, geometry: Geometry, content: impl Into<String>) -> Self {
        Self::new(
            id,
            geometry,
            ElementKind::Text {
                content: content.into(),
                font_size: default_font_size(),
                font_family: default_font_family(),
                font_weight: FontWeight::Normal,
                color: default_text_color(),
                text_align: TextAlign::Left,
                line_height: None,
                letter_spacing: None,
            },
        )
    }

    /// Create a borderless shape element.
    #[must_use]
    pub fn shape(
        id: impl Into<ElementId>,
        geometry: Geometry,
        shape_type: ShapeKind,
        background_color: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            geometry,
            ElementKind::Shape {
                shape_type,
                background_color: background_color.into(),
                border_color: None,
                border_width: None,
                border_radius: None,
                opacity: None,
            },
        )
    }

    /// Create an image element. Pass an empty `src` to crop from the original slide.
    #[must_use]
    pub fn image(id: impl Into<ElementId>, geometry: Geometry, src: impl Into<String>) -> Self {
        Self::new(
            id,
            geometry,
            ElementKind::Image {
                src: src.into(),
                opacity: None,
            },
        )
    }

    /// Whether this is a text element.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    /// Whether the element's pixels are already baked into the synthesized
    /// background, so that it acts as an editable hit region.
    #[must_use]
    pub fn is_baked(&self) -> bool {
        match self.kind {
            ElementKind::Text { .. } => false,
            ElementKind::Shape { .. } | ElementKind::Image { .. } | ElementKind::Chart { .. } => {
                true
            }
        }
    }

    /// Check if a canvas-space point is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.geometry.contains_point(x, y)
    }

    /// Merge a patch into this element.
    ///
    /// Fields that do not apply to this element's kind are ignored.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        let g = &mut self.geometry;
        if let Some(x) = patch.x {
            g.x = x;
        }
        if let Some(y) = patch.y {
            g.y = y;
        }
        if let Some(width) = patch.width {
            g.width = width;
        }
        if let Some(height) = patch.height {
            g.height = height;
        }
        if let Some(z_index) = patch.z_index {
            g.z_index = z_index;
        }
        if let Some(rotation) = patch.rotation {
            g.rotation = Some(rotation);
        }
        self.geometry = self.geometry.normalized();

        match &mut self.kind {
            ElementKind::Text {
                content,
                font_size,
                font_family,
                font_weight,
                color,
                text_align,
                line_height,
                letter_spacing,
            } => {
                set(content, &patch.content);
                if let Some(size) = patch.font_size {
                    *font_size = size.max(1.0);
                }
                set(font_family, &patch.font_family);
                set(font_weight, &patch.font_weight);
                set(color, &patch.color);
                set(text_align, &patch.text_align);
                set_opt(line_height, &patch.line_height);
                set_opt(letter_spacing, &patch.letter_spacing);
            }
            ElementKind::Shape {
                shape_type,
                background_color,
                border_color,
                border_width,
                border_radius,
                opacity,
            } => {
                set(shape_type, &patch.shape_type);
                set(background_color, &patch.background_color);
                set_opt(border_color, &patch.border_color);
                set_opt(border_width, &patch.border_width);
                set_opt(border_radius, &patch.border_radius);
                set_opt(opacity, &patch.opacity.map(clamp_unit));
            }
            ElementKind::Image { src, opacity } => {
                set(src, &patch.src);
                set_opt(opacity, &patch.opacity.map(clamp_unit));
            }
            ElementKind::Chart {
                chart_type,
                fallback_image,
            } => {
                set(chart_type, &patch.chart_type);
                set_opt(fallback_image, &patch.fallback_image);
            }
        }
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        slot.clone_from(v);
    }
}

fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_element_json_is_flat() {
        let element = Element::text("t1", Geometry::new(100.0, 200.0, 500.0, 60.0, 5), "Title");
        let json = serde_json::to_value(&element).expect("serialize");
        assert_eq!(json["id"], "t1");
        assert_eq!(json["type"], "text");
        assert_eq!(json["x"], 100.0);
        assert_eq!(json["zIndex"], 5);
        assert_eq!(json["content"], "Title");
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn test_parse_model_output_element() {
        let json = r##"{
            "id": "elem_1", "type": "text", "x": 100, "y": 200,
            "width": 500, "height": 60, "zIndex": 5.0,
            "content": "标题文字", "fontSize": 48, "fontFamily": "Microsoft YaHei",
            "fontWeight": 700, "color": "#333333", "textAlign": "center"
        }"##;
        let element: Element = serde_json::from_str(json).expect("parse");
        assert_eq!(element.id.as_str(), "elem_1");
        assert_eq!(element.geometry.z_index, 5);
        match element.kind {
            ElementKind::Text {
                font_weight,
                text_align,
                ref content,
                ..
            } => {
                assert_eq!(font_weight, FontWeight::Heavy);
                assert_eq!(text_align, TextAlign::Center);
                assert_eq!(content, "标题文字");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_image_defaults_to_empty_src() {
        let json = r#"{"id":"i","type":"image","x":1,"y":2,"width":3,"height":4,"zIndex":0}"#;
        let element: Element = serde_json::from_str(json).expect("parse");
        assert_eq!(
            element.kind,
            ElementKind::Image {
                src: String::new(),
                opacity: None
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"id":"v","type":"video","x":0,"y":0,"width":1,"height":1,"zIndex":0}"#;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }

    #[test]
    fn test_font_weight_variants() {
        let parse = |s: &str| serde_json::from_str::<FontWeight>(s).expect("weight");
        assert_eq!(parse("\"normal\""), FontWeight::Normal);
        assert_eq!(parse("\"600\""), FontWeight::SemiBold);
        assert_eq!(parse("\"Bold\""), FontWeight::Bold);
        assert_eq!(parse("\"800\""), FontWeight::Heavy);
        assert_eq!(parse("400"), FontWeight::Normal);
        assert_eq!(serde_json::to_string(&FontWeight::SemiBold).expect("ser"), "\"600\"");
    }

    #[test]
    fn test_patch_ignores_fields_of_other_kinds() {
        let mut shape = Element::shape(
            "s1",
            Geometry::new(0.0, 0.0, 10.0, 10.0, 0),
            ShapeKind::Circle,
            "#FF0000",
        );
        let patch = ElementPatch {
            content: Some("ignored".to_string()),
            background_color: Some("#00FF00".to_string()),
            opacity: Some(3.0),
            width: Some(-5.0),
            ..ElementPatch::default()
        };
        shape.apply_patch(&patch);

        assert!((shape.geometry.width - 1.0).abs() < f32::EPSILON);
        match shape.kind {
            ElementKind::Shape {
                ref background_color,
                opacity,
                ..
            } => {
                assert_eq!(background_color, "#00FF00");
                assert_eq!(opacity, Some(1.0));
            }
            other => panic!("expected shape, got {other:?}"),
        }
    }

    #[test]
    fn test_baked_kinds() {
        let g = Geometry::default();
        assert!(!Element::text("t", g, "x").is_baked());
        assert!(Element::image("i", g, "").is_baked());
        assert!(Element::shape("s", g, ShapeKind::Rectangle, "#fff").is_baked());
    }
}
