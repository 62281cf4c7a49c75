//! Interactive editing surface.
//!
//! The surface resolves pointer gestures in view space against element
//! geometry in canvas space and feeds the resulting edits to an
//! [`EditHistory`]. Gesture state is an explicit state machine
//! ([`Interaction`]); selection is UI state and never produces a history
//! entry.
//!
//! A drag or resize is previewed live while the pointer moves and committed
//! as a single history entry when the pointer is released.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::{
    EditHistory, Element, ElementId, ElementKind, ElementPatch, Geometry, InputEvent, KeyModifiers,
    PointerEvent, PointerPhase, SceneDocument, SlideError, SlideResult, CANVAS_HEIGHT,
    CANVAS_WIDTH,
};

/// View scale presets offered by editor chrome.
pub const SCALE_PRESETS: [f32; 4] = [0.25, 0.5, 0.75, 1.0];

/// Smallest accepted view scale.
pub const MIN_SCALE: f32 = 0.1;

/// Largest accepted view scale.
pub const MAX_SCALE: f32 = 4.0;

/// Display opacity of text elements.
pub const TEXT_OPACITY: f32 = 1.0;

/// Display opacity of an unselected baked element (shape, image, chart).
pub const HIT_REGION_OPACITY: f32 = 0.05;

/// Display opacity of the selected baked element.
pub const SELECTED_HIT_REGION_OPACITY: f32 = 0.3;

const MIN_SIZE: f32 = 1.0;

#[allow(clippy::cast_precision_loss)]
const CANVAS_W: f32 = CANVAS_WIDTH as f32;
#[allow(clippy::cast_precision_loss)]
const CANVAS_H: f32 = CANVAS_HEIGHT as f32;

/// Editing surface settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceConfig {
    /// Initial view scale (view pixel = canvas pixel x scale).
    pub scale: f32,
    /// Pointer travel in view pixels before a press becomes a drag.
    pub drag_threshold: f32,
    /// Edge length of a resize handle in view pixels.
    pub handle_size: f32,
    /// Undo steps retained.
    pub history_limit: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            drag_threshold: 3.0,
            handle_size: 10.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Mapping between view space and canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    scale: f32,
}

impl ViewTransform {
    /// Create a transform, clamping the scale to [`MIN_SCALE`]..=[`MAX_SCALE`].
    ///
    /// Non-finite scales fall back to 1.
    #[must_use]
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        Self {
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// The view scale.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Convert a view-space point to canvas space.
    #[must_use]
    pub fn to_canvas(&self, view: Point) -> Point {
        Point::new(view.x / self.scale, view.y / self.scale)
    }

    /// Convert a canvas-space point to view space.
    #[must_use]
    pub fn to_view(&self, canvas: Point) -> Point {
        Point::new(canvas.x * self.scale, canvas.y * self.scale)
    }

    /// Convert a view-space length to canvas space.
    #[must_use]
    pub fn len_to_canvas(&self, view: f32) -> f32 {
        view / self.scale
    }

    /// Size of the displayed canvas in view pixels.
    #[must_use]
    pub fn view_size(&self) -> (f32, f32) {
        (CANVAS_W * self.scale, CANVAS_H * self.scale)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(SurfaceConfig::default().scale)
    }
}

/// One of the eight resize handles of the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    const fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left)
    }

    const fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight | Self::Right)
    }

    const fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::Top)
    }

    const fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight | Self::Bottom)
    }

    /// Center of the handle in canvas space.
    #[must_use]
    pub fn anchor(self, geometry: &Geometry) -> Point {
        let x = if self.moves_left() {
            geometry.x
        } else if self.moves_right() {
            geometry.right()
        } else {
            geometry.x + geometry.width / 2.0
        };
        let y = if self.moves_top() {
            geometry.y
        } else if self.moves_bottom() {
            geometry.bottom()
        } else {
            geometry.y + geometry.height / 2.0
        };
        Point::new(x, y)
    }

    /// Resize `origin` by a canvas-space pointer delta.
    ///
    /// The dragged edges move; the opposite edges stay put. The result keeps
    /// the minimum size and stays inside the canvas.
    #[must_use]
    pub fn resize(self, origin: &Geometry, dx: f32, dy: f32) -> Geometry {
        let (mut left, mut top) = (origin.x, origin.y);
        let (mut right, mut bottom) = (origin.right(), origin.bottom());

        if self.moves_left() {
            left = clamp_span(left + dx, 0.0, right - MIN_SIZE);
        }
        if self.moves_right() {
            right = clamp_span(right + dx, left + MIN_SIZE, CANVAS_W);
        }
        if self.moves_top() {
            top = clamp_span(top + dy, 0.0, bottom - MIN_SIZE);
        }
        if self.moves_bottom() {
            bottom = clamp_span(bottom + dy, top + MIN_SIZE, CANVAS_H);
        }

        Geometry {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
            ..*origin
        }
        .normalized()
    }
}

/// Clamp into `[min, max]`; `min` wins when the range is empty.
fn clamp_span(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Move `origin` by a canvas-space delta, keeping it inside the canvas.
#[must_use]
pub fn drag_geometry(origin: &Geometry, dx: f32, dy: f32) -> Geometry {
    Geometry {
        x: clamp_span(origin.x + dx, 0.0, CANVAS_W - origin.width),
        y: clamp_span(origin.y + dy, 0.0, CANVAS_H - origin.height),
        ..*origin
    }
}

/// Gesture state of the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// No gesture in progress.
    Idle,
    /// Pointer pressed on the selected element, below the drag threshold.
    Candidate {
        /// Pressed element.
        element: ElementId,
        /// Press position in canvas space.
        start: Point,
        /// Geometry at press time.
        origin: Geometry,
    },
    /// Element being moved.
    Dragging {
        /// Dragged element.
        element: ElementId,
        /// Press position in canvas space.
        start: Point,
        /// Geometry at press time.
        origin: Geometry,
        /// Live preview geometry.
        current: Geometry,
    },
    /// Element being resized from a handle.
    Resizing {
        /// Resized element.
        element: ElementId,
        /// Handle being dragged.
        handle: ResizeHandle,
        /// Press position in canvas space.
        start: Point,
        /// Geometry at press time.
        origin: Geometry,
        /// Live preview geometry.
        current: Geometry,
    },
}

impl Interaction {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Element and preview geometry of a drag or resize.
    #[must_use]
    pub fn preview(&self) -> Option<(&ElementId, &Geometry)> {
        match self {
            Self::Dragging {
                element, current, ..
            }
            | Self::Resizing {
                element, current, ..
            } => Some((element, current)),
            Self::Idle | Self::Candidate { .. } => None,
        }
    }
}

/// What an input event did to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceResponse {
    /// Nothing changed.
    Unchanged,
    /// The selection changed (to the given element, or cleared).
    SelectionChanged(Option<ElementId>),
    /// A gesture preview changed; the document did not.
    Preview,
    /// The document changed and a history entry was recorded.
    Committed,
    /// The active gesture was abandoned without an edit.
    Cancelled,
    /// The present document moved through history.
    HistoryMoved,
}

/// One painted layer of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderLayer {
    /// The element, with preview geometry applied during a gesture.
    pub element: Element,
    /// Display opacity.
    pub opacity: f32,
    /// Whether the element is selected.
    pub selected: bool,
}

/// Display opacity of an element on the editing surface.
///
/// Baked elements are already visible in the background layer and are shown
/// as faint hit regions; text is always fully visible.
#[must_use]
pub fn display_opacity(element: &Element, selected: bool) -> f32 {
    if !element.is_baked() {
        TEXT_OPACITY
    } else if selected {
        SELECTED_HIT_REGION_OPACITY
    } else {
        HIT_REGION_OPACITY
    }
}

/// Painted layers of a document with nothing selected, in paint order.
#[must_use]
pub fn render_plan(document: &SceneDocument) -> Vec<RenderLayer> {
    document
        .paint_order()
        .into_iter()
        .map(|element| RenderLayer {
            element: element.clone(),
            opacity: display_opacity(element, false),
            selected: false,
        })
        .collect()
}

/// The interactive editing surface over one document.
#[derive(Debug, Clone)]
pub struct EditingSurface {
    history: EditHistory,
    config: SurfaceConfig,
    view: ViewTransform,
    selection: Option<ElementId>,
    interaction: Interaction,
}

impl EditingSurface {
    /// Open a document with default settings.
    #[must_use]
    pub fn new(document: SceneDocument) -> Self {
        Self::with_config(document, SurfaceConfig::default())
    }

    /// Open a document with the given settings.
    #[must_use]
    pub fn with_config(document: SceneDocument, config: SurfaceConfig) -> Self {
        Self {
            history: EditHistory::with_limit(document, config.history_limit),
            view: ViewTransform::new(config.scale),
            config,
            selection: None,
            interaction: Interaction::Idle,
        }
    }

    /// The present document.
    #[must_use]
    pub fn document(&self) -> &SceneDocument {
        self.history.present()
    }

    /// The edit history.
    #[must_use]
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Surface settings.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Current view transform.
    #[must_use]
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Current gesture state.
    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Selected element ID.
    #[must_use]
    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// Selected element, if it still exists.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selection
            .as_ref()
            .and_then(|id| self.document().element(id))
    }

    /// Consume the surface, returning the present document.
    #[must_use]
    pub fn into_document(self) -> SceneDocument {
        self.history.into_present()
    }

    /// Change the view scale. Cancels any gesture in progress.
    pub fn set_scale(&mut self, scale: f32) {
        self.cancel_gesture();
        self.view = ViewTransform::new(scale);
        tracing::debug!("View scale set to {}", self.view.scale());
    }

    /// Select an element by ID.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::ElementNotFound`] if no element has this ID.
    pub fn select(&mut self, id: &ElementId) -> SlideResult<()> {
        if !self.document().contains(id) {
            return Err(SlideError::ElementNotFound(id.to_string()));
        }
        self.cancel_gesture();
        self.selection = Some(id.clone());
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.cancel_gesture();
        self.selection = None;
    }

    /// Merge a patch into an element as one history entry.
    ///
    /// Returns `false` when nothing changed, including for unknown IDs.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        self.history.apply(|doc| doc.update_element(id, patch))
    }

    /// Merge a patch into the selected element.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> bool {
        match self.selection.clone() {
            Some(id) => self.update_element(&id, patch),
            None => false,
        }
    }

    /// Replace the content of the selected text element.
    pub fn edit_text(&mut self, content: impl Into<String>) -> bool {
        if !self.selected_element().is_some_and(Element::is_text) {
            return false;
        }
        self.update_selected(&ElementPatch::content(content))
    }

    /// Add an element and select it.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::DuplicateElement`] if the ID is already used.
    pub fn add_element(&mut self, element: Element) -> SlideResult<()> {
        let id = element.id.clone();
        let next = self.document().add_element(element)?;
        self.cancel_gesture();
        self.history.commit(next);
        self.selection = Some(id);
        Ok(())
    }

    /// Add a new element under a freshly generated ID and select it.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::DuplicateElement`] if the generated ID collides.
    pub fn insert(&mut self, geometry: Geometry, kind: ElementKind) -> SlideResult<ElementId> {
        let id = ElementId::generate();
        self.add_element(Element::new(id.clone(), geometry, kind))?;
        Ok(id)
    }

    /// Remove the selected element.
    pub fn remove_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        self.cancel_gesture();
        self.history.apply(|doc| doc.remove_element(&id))
    }

    /// Undo the last edit.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let moved = self.history.undo();
        self.drop_stale_selection();
        moved
    }

    /// Redo the last undone edit.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let moved = self.history.redo();
        self.drop_stale_selection();
        moved
    }

    /// Painted layers in paint order, with gesture previews applied.
    #[must_use]
    pub fn render_layers(&self) -> Vec<RenderLayer> {
        let preview = self.interaction.preview();
        self.document()
            .paint_order()
            .into_iter()
            .map(|element| {
                let selected = self.selection.as_ref() == Some(&element.id);
                let mut element = element.clone();
                if let Some((id, geometry)) = preview {
                    if *id == element.id {
                        element.geometry = *geometry;
                    }
                }
                RenderLayer {
                    opacity: display_opacity(&element, selected),
                    element,
                    selected,
                }
            })
            .collect()
    }

    /// Resize handle of the selected element under a view-space point.
    #[must_use]
    pub fn handle_at(&self, view: Point) -> Option<ResizeHandle> {
        let geometry = self.selected_element()?.geometry;
        let half = self.config.handle_size / 2.0;
        ResizeHandle::ALL.into_iter().find(|handle| {
            let anchor = self.view.to_view(handle.anchor(&geometry));
            (anchor.x - view.x).abs() <= half && (anchor.y - view.y).abs() <= half
        })
    }

    /// Dispatch an input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> SurfaceResponse {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Key {
                key,
                pressed,
                modifiers,
            } => {
                if *pressed {
                    self.handle_key(key, *modifiers)
                } else {
                    SurfaceResponse::Unchanged
                }
            }
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> SurfaceResponse {
        let view = Point::new(event.x, event.y);
        match event.phase {
            PointerPhase::Down if event.is_primary() => self.pointer_down(view),
            PointerPhase::Down => SurfaceResponse::Unchanged,
            PointerPhase::Move => self.pointer_move(view),
            PointerPhase::Up => self.pointer_up(view),
            PointerPhase::Cancel => {
                if self.cancel_gesture() {
                    SurfaceResponse::Cancelled
                } else {
                    SurfaceResponse::Unchanged
                }
            }
        }
    }

    fn handle_key(&mut self, key: &str, modifiers: KeyModifiers) -> SurfaceResponse {
        let history_moved = |moved: bool| {
            if moved {
                SurfaceResponse::HistoryMoved
            } else {
                SurfaceResponse::Unchanged
            }
        };

        if modifiers.command() {
            if key.eq_ignore_ascii_case("z") {
                let moved = if modifiers.shift {
                    self.redo()
                } else {
                    self.undo()
                };
                return history_moved(moved);
            }
            if key.eq_ignore_ascii_case("y") {
                return history_moved(self.redo());
            }
            return SurfaceResponse::Unchanged;
        }

        match key {
            "Delete" | "Backspace" => {
                if self.remove_selected() {
                    SurfaceResponse::Committed
                } else {
                    SurfaceResponse::Unchanged
                }
            }
            "Escape" => {
                if self.cancel_gesture() {
                    SurfaceResponse::Cancelled
                } else if self.selection.take().is_some() {
                    SurfaceResponse::SelectionChanged(None)
                } else {
                    SurfaceResponse::Unchanged
                }
            }
            _ => SurfaceResponse::Unchanged,
        }
    }

    /// Press at a view-space point.
    pub fn pointer_down(&mut self, view: Point) -> SurfaceResponse {
        self.cancel_gesture();
        let start = self.view.to_canvas(view);

        if let Some(handle) = self.handle_at(view) {
            if let Some(element) = self.selected_element() {
                let origin = element.geometry;
                self.interaction = Interaction::Resizing {
                    element: element.id.clone(),
                    handle,
                    start,
                    origin,
                    current: origin,
                };
                return SurfaceResponse::Unchanged;
            }
        }

        let hit = self
            .document()
            .element_at(start.x, start.y)
            .map(|e| (e.id.clone(), e.geometry));

        match hit {
            Some((id, origin)) if self.selection.as_ref() == Some(&id) => {
                self.interaction = Interaction::Candidate {
                    element: id,
                    start,
                    origin,
                };
                SurfaceResponse::Unchanged
            }
            Some((id, _)) => {
                tracing::debug!("Selected element {id}");
                self.selection = Some(id.clone());
                SurfaceResponse::SelectionChanged(Some(id))
            }
            None => {
                if self.selection.take().is_some() {
                    SurfaceResponse::SelectionChanged(None)
                } else {
                    SurfaceResponse::Unchanged
                }
            }
        }
    }

    /// Pointer moved to a view-space point.
    pub fn pointer_move(&mut self, view: Point) -> SurfaceResponse {
        let pos = self.view.to_canvas(view);
        let threshold = self.view.len_to_canvas(self.config.drag_threshold);

        match &mut self.interaction {
            Interaction::Idle => SurfaceResponse::Unchanged,
            Interaction::Candidate {
                element,
                start,
                origin,
            } => {
                if pos.distance(*start) <= threshold {
                    return SurfaceResponse::Unchanged;
                }
                let current = drag_geometry(origin, pos.x - start.x, pos.y - start.y);
                self.interaction = Interaction::Dragging {
                    element: element.clone(),
                    start: *start,
                    origin: *origin,
                    current,
                };
                SurfaceResponse::Preview
            }
            Interaction::Dragging {
                start,
                origin,
                current,
                ..
            } => {
                *current = drag_geometry(origin, pos.x - start.x, pos.y - start.y);
                SurfaceResponse::Preview
            }
            Interaction::Resizing {
                handle,
                start,
                origin,
                current,
                ..
            } => {
                *current = handle.resize(origin, pos.x - start.x, pos.y - start.y);
                SurfaceResponse::Preview
            }
        }
    }

    /// Release at a view-space point, committing a drag or resize.
    pub fn pointer_up(&mut self, view: Point) -> SurfaceResponse {
        if self.interaction.is_active() {
            self.pointer_move(view);
        }

        let patch = match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::Idle | Interaction::Candidate { .. } => {
                return SurfaceResponse::Unchanged;
            }
            Interaction::Dragging {
                element,
                origin,
                current,
                ..
            } => (current != origin)
                .then(|| (element, ElementPatch::position(current.x, current.y))),
            Interaction::Resizing {
                element,
                origin,
                current,
                ..
            } => (current != origin).then(|| (element, ElementPatch::bounds(&current))),
        };

        match patch {
            Some((id, patch)) if self.update_element(&id, &patch) => {
                tracing::debug!("Committed gesture on element {id}");
                SurfaceResponse::Committed
            }
            _ => SurfaceResponse::Unchanged,
        }
    }

    /// Abandon any gesture in progress. Returns whether one was active.
    pub fn cancel_gesture(&mut self) -> bool {
        std::mem::replace(&mut self.interaction, Interaction::Idle).is_active()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selection {
            if !self.document().contains(id) {
                self.selection = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeKind;

    fn doc() -> SceneDocument {
        SceneDocument::new("page_1")
            .with_element(Element::text(
                "e1",
                Geometry::new(10.0, 10.0, 100.0, 100.0, 1),
                "Hello",
            ))
            .and_then(|d| {
                d.with_element(Element::shape(
                    "bg",
                    Geometry::new(400.0, 400.0, 200.0, 200.0, 0),
                    ShapeKind::Rectangle,
                    "#336699",
                ))
            })
            .expect("build")
    }

    fn x_of(surface: &EditingSurface, id: &str) -> f32 {
        surface
            .document()
            .element(&id.into())
            .expect("element")
            .geometry
            .x
    }

    // ========================================================================
    // View transform
    // ========================================================================

    #[test]
    fn test_view_transform_clamps_scale() {
        assert!((ViewTransform::new(0.0).scale() - MIN_SCALE).abs() < f32::EPSILON);
        assert!((ViewTransform::new(10.0).scale() - MAX_SCALE).abs() < f32::EPSILON);
        assert!((ViewTransform::new(f32::NAN).scale() - 1.0).abs() < f32::EPSILON);
        let (w, h) = ViewTransform::new(0.5).view_size();
        assert!((w - 960.0).abs() < f32::EPSILON && (h - 540.0).abs() < f32::EPSILON);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[test]
    fn test_click_selects_without_history() {
        let mut surface = EditingSurface::new(doc());
        let response = surface.pointer_down(Point::new(30.0, 30.0));
        assert_eq!(response, SurfaceResponse::SelectionChanged(Some("e1".into())));
        surface.pointer_up(Point::new(30.0, 30.0));
        assert!(!surface.history().can_undo());
    }

    #[test]
    fn test_background_press_deselects() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        let response = surface.pointer_down(Point::new(900.0, 10.0));
        assert_eq!(response, SurfaceResponse::SelectionChanged(None));
        assert!(surface.selection().is_none());
    }

    #[test]
    fn test_select_unknown_is_error() {
        let mut surface = EditingSurface::new(doc());
        assert!(matches!(
            surface.select(&"ghost".into()),
            Err(SlideError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_unselected_element_does_not_drag() {
        let mut surface = EditingSurface::new(doc());
        surface.pointer_down(Point::new(30.0, 30.0));
        surface.pointer_move(Point::new(80.0, 80.0));
        assert_eq!(surface.pointer_up(Point::new(80.0, 80.0)), SurfaceResponse::Unchanged);
        assert!((x_of(&surface, "e1") - 10.0).abs() < f32::EPSILON);
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    #[test]
    fn test_drag_then_undo() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");

        // Scale 0.5: a 20 view-pixel drag is 40 canvas pixels.
        surface.pointer_down(Point::new(30.0, 30.0));
        assert_eq!(surface.pointer_move(Point::new(40.0, 40.0)), SurfaceResponse::Preview);
        assert_eq!(surface.pointer_move(Point::new(50.0, 50.0)), SurfaceResponse::Preview);
        assert!((x_of(&surface, "e1") - 10.0).abs() < f32::EPSILON);
        assert_eq!(surface.pointer_up(Point::new(50.0, 50.0)), SurfaceResponse::Committed);

        assert!((x_of(&surface, "e1") - 50.0).abs() < f32::EPSILON);
        assert_eq!(surface.history().past_len(), 1);

        assert!(surface.undo());
        assert!((x_of(&surface, "e1") - 10.0).abs() < f32::EPSILON);
        assert_eq!(surface.history().past_len(), 0);
        assert_eq!(surface.history().future_len(), 1);
    }

    #[test]
    fn test_small_movement_is_a_click() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        surface.pointer_down(Point::new(30.0, 30.0));
        assert_eq!(surface.pointer_move(Point::new(31.0, 31.0)), SurfaceResponse::Unchanged);
        assert_eq!(surface.pointer_up(Point::new(31.0, 31.0)), SurfaceResponse::Unchanged);
        assert!(!surface.history().can_undo());
    }

    #[test]
    fn test_drag_preview_in_render_layers() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        surface.pointer_down(Point::new(30.0, 30.0));
        surface.pointer_move(Point::new(130.0, 30.0));

        let layers = surface.render_layers();
        let layer = layers
            .iter()
            .find(|l| l.element.id.as_str() == "e1")
            .expect("layer");
        assert!((layer.element.geometry.x - 210.0).abs() < f32::EPSILON);
        assert!(layer.selected);
    }

    #[test]
    fn test_drag_clamped_to_canvas() {
        let mut surface = EditingSurface::with_config(
            doc(),
            SurfaceConfig {
                scale: 1.0,
                ..SurfaceConfig::default()
            },
        );
        surface.select(&"e1".into()).expect("select");
        surface.pointer_down(Point::new(50.0, 50.0));
        surface.pointer_up(Point::new(-500.0, 5000.0));

        let g = surface.document().element(&"e1".into()).expect("e1").geometry;
        assert!(g.x.abs() < f32::EPSILON);
        assert!((g.y - 980.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pointer_cancel_discards_drag() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        surface.pointer_down(Point::new(30.0, 30.0));
        surface.pointer_move(Point::new(90.0, 90.0));
        let response = surface.handle_event(&InputEvent::Pointer(PointerEvent::new(
            PointerPhase::Cancel,
            90.0,
            90.0,
        )));
        assert_eq!(response, SurfaceResponse::Cancelled);
        assert!((x_of(&surface, "e1") - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_scale_cancels_gesture() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        surface.pointer_down(Point::new(30.0, 30.0));
        surface.pointer_move(Point::new(90.0, 90.0));
        surface.set_scale(1.0);
        assert!(!surface.interaction().is_active());
        assert_eq!(surface.pointer_up(Point::new(90.0, 90.0)), SurfaceResponse::Unchanged);
    }

    // ========================================================================
    // Resizing
    // ========================================================================

    #[test]
    fn test_resize_from_bottom_right_handle() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        // Bottom-right corner of e1 at (110, 110) canvas = (55, 55) view.
        assert_eq!(
            surface.handle_at(Point::new(55.0, 55.0)),
            Some(ResizeHandle::BottomRight)
        );
        surface.pointer_down(Point::new(55.0, 55.0));
        assert!(matches!(surface.interaction(), Interaction::Resizing { .. }));
        assert_eq!(surface.pointer_up(Point::new(105.0, 80.0)), SurfaceResponse::Committed);

        let g = surface.document().element(&"e1".into()).expect("e1").geometry;
        assert!((g.x - 10.0).abs() < f32::EPSILON);
        assert!((g.width - 200.0).abs() < f32::EPSILON);
        assert!((g.height - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_resize_keeps_minimum_size() {
        let origin = Geometry::new(10.0, 10.0, 100.0, 100.0, 0);
        let g = ResizeHandle::Left.resize(&origin, 500.0, 0.0);
        assert!((g.width - 1.0).abs() < f32::EPSILON);
        assert!((g.right() - 110.0).abs() < f32::EPSILON);

        let g = ResizeHandle::Top.resize(&origin, 0.0, -50.0);
        assert!(g.y.abs() < f32::EPSILON);
        assert!((g.height - 110.0).abs() < f32::EPSILON);
    }

    // ========================================================================
    // Opacity
    // ========================================================================

    #[test]
    fn test_display_opacity() {
        let mut surface = EditingSurface::new(doc());
        let layers = surface.render_layers();
        assert_eq!(layers[0].element.id.as_str(), "bg");
        assert!((layers[0].opacity - HIT_REGION_OPACITY).abs() < f32::EPSILON);
        assert!((layers[1].opacity - TEXT_OPACITY).abs() < f32::EPSILON);

        surface.select(&"bg".into()).expect("select");
        let layers = surface.render_layers();
        assert!((layers[0].opacity - SELECTED_HIT_REGION_OPACITY).abs() < f32::EPSILON);
    }

    // ========================================================================
    // Keyboard and editing commands
    // ========================================================================

    #[test]
    fn test_keyboard_undo_redo_and_delete() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        assert_eq!(
            surface.handle_event(&InputEvent::key("Delete", KeyModifiers::default())),
            SurfaceResponse::Committed
        );
        assert!(!surface.document().contains(&"e1".into()));

        assert_eq!(
            surface.handle_event(&InputEvent::key("z", KeyModifiers::cmd())),
            SurfaceResponse::HistoryMoved
        );
        assert!(surface.document().contains(&"e1".into()));

        assert_eq!(
            surface.handle_event(&InputEvent::key("Z", KeyModifiers::cmd_shift())),
            SurfaceResponse::HistoryMoved
        );
        assert!(!surface.document().contains(&"e1".into()));
        assert!(surface.selection().is_none());
    }

    #[test]
    fn test_escape_clears_selection() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"e1".into()).expect("select");
        assert_eq!(
            surface.handle_event(&InputEvent::key("Escape", KeyModifiers::default())),
            SurfaceResponse::SelectionChanged(None)
        );
    }

    #[test]
    fn test_edit_text_only_for_text() {
        let mut surface = EditingSurface::new(doc());
        surface.select(&"bg".into()).expect("select");
        assert!(!surface.edit_text("nope"));
        surface.select(&"e1".into()).expect("select");
        assert!(surface.edit_text("Changed"));
        assert_eq!(surface.history().past_len(), 1);
    }

    #[test]
    fn test_add_element_selects_it() {
        let mut surface = EditingSurface::new(doc());
        surface
            .add_element(Element::text("new", Geometry::default(), "New"))
            .expect("add");
        assert_eq!(surface.selection(), Some(&"new".into()));
        assert!(surface.add_element(Element::text("new", Geometry::default(), "x")).is_err());
        assert_eq!(surface.history().past_len(), 1);
    }

    #[test]
    fn test_insert_generates_unique_ids() {
        let mut surface = EditingSurface::new(doc());
        let kind = Element::text("tmp", Geometry::default(), "New").kind;
        let first = surface
            .insert(Geometry::new(50.0, 50.0, 200.0, 40.0, 3), kind.clone())
            .expect("insert");
        let second = surface.insert(Geometry::default(), kind).expect("insert");

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("elem_"));
        assert_eq!(surface.selection(), Some(&second));
        assert_eq!(surface.document().element_count(), 4);
        assert_eq!(surface.history().past_len(), 2);
    }

    #[test]
    fn test_stale_update_records_nothing() {
        let mut surface = EditingSurface::new(doc());
        assert!(!surface.update_element(&"gone".into(), &ElementPatch::position(5.0, 5.0)));
        assert!(!surface.history().can_undo());
    }
}
