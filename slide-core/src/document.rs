//! Scene documents: the editable representation of one slide.

use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Element, ElementId, ElementPatch, SlideError, SlideResult};

/// Logical canvas width in pixels. All geometry is expressed in this space.
pub const CANVAS_WIDTH: u32 = 1920;

/// Logical canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1080;

/// Fill used when a document has no background color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";

/// Page id used when a document has none.
pub const DEFAULT_PAGE_ID: &str = "page_1";

/// Shared, immutable image payload (a data URI or URL).
///
/// Slide images are several megabytes of base64; cloning a document for a
/// history snapshot only bumps a reference count.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(Arc<str>);

impl ImageRef {
    /// Wrap an image URI.
    #[must_use]
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    /// The URI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both references point at the same allocation.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Length of the URI in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the URI is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is an inline `data:` URI.
    #[must_use]
    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl std::fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let head: String = self.0.chars().take(32).collect();
        write!(f, "ImageRef({head}... {} bytes)", self.0.len())
    }
}

impl From<String> for ImageRef {
    fn from(uri: String) -> Self {
        Self(uri.into())
    }
}

impl From<&str> for ImageRef {
    fn from(uri: &str) -> Self {
        Self(uri.into())
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The structured, editable representation of one slide.
///
/// Documents are values: every edit produces a new document, so snapshots
/// held by the edit history are never mutated in place. The canvas is always
/// [`CANVAS_WIDTH`] x [`CANVAS_HEIGHT`], whatever a producer reports.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "DocumentRepr")]
pub struct SceneDocument {
    id: String,
    background_color: Option<String>,
    background_image: Option<ImageRef>,
    original_image: Option<ImageRef>,
    elements: Vec<Element>,
}

impl SceneDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            background_color: None,
            background_image: None,
            original_image: None,
            elements: Vec::new(),
        }
    }

    /// Document identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canvas size in pixels; always 1920x1080.
    #[must_use]
    pub const fn canvas_size(&self) -> (u32, u32) {
        (CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Solid background color, if any.
    #[must_use]
    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    /// Background color to paint, falling back to white.
    #[must_use]
    pub fn effective_background_color(&self) -> &str {
        self.background_color
            .as_deref()
            .unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    /// Synthesized text-free background layer.
    #[must_use]
    pub fn background_image(&self) -> Option<&ImageRef> {
        self.background_image.as_ref()
    }

    /// The unmodified source slide.
    #[must_use]
    pub fn original_image(&self) -> Option<&ImageRef> {
        self.original_image.as_ref()
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by ID.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Check whether an element exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Elements in paint order: ascending z-index, ties in document order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<_> = self.elements.iter().collect();
        // Stable sort keeps document order for equal z-index.
        ordered.sort_by_key(|e| e.geometry.z_index);
        ordered
    }

    /// Text elements in document order.
    pub fn text_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_text())
    }

    /// Find the topmost element at the given canvas coordinates.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<&Element> {
        self.paint_order()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(x, y))
    }

    /// Set the document ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the solid background color.
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Attach the synthesized background layer.
    #[must_use]
    pub fn with_background_image(mut self, image: ImageRef) -> Self {
        self.background_image = Some(image);
        self
    }

    /// Attach the original source slide.
    #[must_use]
    pub fn with_original_image(mut self, image: ImageRef) -> Self {
        self.original_image = Some(image);
        self
    }

    /// Append an element while building a document.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::DuplicateElement`] if the ID is already used.
    pub fn with_element(mut self, element: Element) -> SlideResult<Self> {
        if self.contains(&element.id) {
            return Err(SlideError::DuplicateElement(element.id.to_string()));
        }
        self.elements.push(element);
        Ok(self)
    }

    /// Return a new document where the element `id` has `patch` merged in.
    ///
    /// An unknown ID yields an unchanged copy: stale IDs from late UI
    /// callbacks are expected and are not an error.
    #[must_use]
    pub fn update_element(&self, id: &ElementId, patch: &ElementPatch) -> Self {
        let mut next = self.clone();
        match next.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => element.apply_patch(patch),
            None => tracing::debug!("Ignoring update for stale element id {id}"),
        }
        next
    }

    /// Return a new document with `element` appended.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::DuplicateElement`] if the ID is already used.
    pub fn add_element(&self, element: Element) -> SlideResult<Self> {
        self.clone().with_element(element)
    }

    /// Return a new document without the element `id` (unchanged if absent).
    #[must_use]
    pub fn remove_element(&self, id: &ElementId) -> Self {
        let mut next = self.clone();
        next.elements.retain(|e| &e.id != id);
        next
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SlideResult<String> {
        serde_json::to_string(self).map_err(SlideError::Serialization)
    }

    /// Serialize the document to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> SlideResult<String> {
        serde_json::to_string_pretty(self).map_err(SlideError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or element IDs collide.
    pub fn from_json(json: &str) -> SlideResult<Self> {
        serde_json::from_str(json).map_err(SlideError::Serialization)
    }
}

impl Serialize for SceneDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SceneDocument", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("width", &CANVAS_WIDTH)?;
        state.serialize_field("height", &CANVAS_HEIGHT)?;
        match &self.background_color {
            Some(color) => state.serialize_field("backgroundColor", color)?,
            None => state.skip_field("backgroundColor")?,
        }
        match &self.background_image {
            Some(image) => state.serialize_field("backgroundImage", image)?,
            None => state.skip_field("backgroundImage")?,
        }
        match &self.original_image {
            Some(image) => state.serialize_field("originalImage", image)?,
            None => state.skip_field("originalImage")?,
        }
        state.serialize_field("elements", &self.elements)?;
        state.end()
    }
}

/// Wire form of a document. `width`/`height` are accepted and ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRepr {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    background_image: Option<ImageRef>,
    #[serde(default)]
    original_image: Option<ImageRef>,
    elements: Vec<Element>,
}

impl TryFrom<DocumentRepr> for SceneDocument {
    type Error = SlideError;

    fn try_from(repr: DocumentRepr) -> Result<Self, Self::Error> {
        let mut doc = Self {
            id: repr
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_PAGE_ID.to_string()),
            background_color: repr.background_color.filter(|c| !c.is_empty()),
            background_image: repr.background_image.filter(|i| !i.is_empty()),
            original_image: repr.original_image.filter(|i| !i.is_empty()),
            elements: Vec::with_capacity(repr.elements.len()),
        };
        for mut element in repr.elements {
            element.geometry = element.geometry.normalized();
            if doc.contains(&element.id) {
                return Err(SlideError::InvalidDocument(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
            doc.elements.push(element);
        }
        Ok(doc)
    }
}
