//! WebAssembly bindings for slide-core.
//!
//! This module provides a JavaScript-callable editor when compiled to WASM.

use wasm_bindgen::prelude::*;

use crate::{
    EditorSession, Element, ElementPatch, Geometry, InputEvent, KeyModifiers, PointerEvent, PointerPhase,
    SceneDocument, SurfaceResponse,
};

/// Initialize the slide editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Browser-facing editor over one editor session.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with no open document.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: EditorSession::default(),
        }
    }

    /// Open a scene document serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<(), String> {
        let document = SceneDocument::from_json(json).map_err(|e| e.to_string())?;
        self.session.open(document);
        Ok(())
    }

    /// Close the document, returning its final JSON (empty if none was open).
    #[wasm_bindgen(js_name = closeDocument)]
    pub fn close_document(&mut self) -> String {
        self.session
            .close()
            .and_then(|doc| doc.to_json().ok())
            .unwrap_or_default()
    }

    /// Get the present document as JSON (empty if none is open).
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.session
            .surface()
            .and_then(|s| s.document().to_json().ok())
            .unwrap_or_default()
    }

    /// Get the painted layers as a JSON array of
    /// `{element, opacity, selected}` objects.
    #[wasm_bindgen(js_name = getLayersJson)]
    #[must_use]
    pub fn get_layers_json(&self) -> String {
        let Some(surface) = self.session.surface() else {
            return "[]".to_string();
        };
        let layers: Vec<_> = surface
            .render_layers()
            .into_iter()
            .map(|layer| {
                serde_json::json!({
                    "element": layer.element,
                    "opacity": layer.opacity,
                    "selected": layer.selected,
                })
            })
            .collect();
        serde_json::Value::Array(layers).to_string()
    }

    /// Set the view scale.
    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f32) {
        if let Some(surface) = self.session.surface_mut() {
            surface.set_scale(scale);
        }
    }

    /// Feed a pointer event in view coordinates.
    ///
    /// `phase` is one of `down`, `move`, `up`, `cancel`. Returns whether the
    /// canvas needs to be redrawn.
    #[wasm_bindgen(js_name = pointerEvent)]
    pub fn pointer_event(&mut self, phase: &str, x: f32, y: f32, button: u8) -> bool {
        let phase = match phase {
            "down" => PointerPhase::Down,
            "move" => PointerPhase::Move,
            "up" => PointerPhase::Up,
            "cancel" => PointerPhase::Cancel,
            _ => return false,
        };
        let event = PointerEvent {
            phase,
            x,
            y,
            button,
            timestamp_ms: now_ms(),
        };
        self.dispatch(&InputEvent::Pointer(event))
    }

    /// Feed a key press. Returns whether the canvas needs to be redrawn.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, meta: bool) -> bool {
        let modifiers = KeyModifiers {
            shift,
            ctrl,
            alt: false,
            meta,
        };
        self.dispatch(&InputEvent::key(key, modifiers))
    }

    /// Merge a JSON patch into the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch is not valid JSON.
    #[wasm_bindgen(js_name = patchSelected)]
    pub fn patch_selected(&mut self, patch_json: &str) -> Result<bool, String> {
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        Ok(self
            .session
            .surface_mut()
            .is_some_and(|s| s.update_selected(&patch)))
    }

    /// Add a text element at the given canvas box and select it.
    ///
    /// Returns the generated element ID, or `None` with no open document.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self, x: f32, y: f32, width: f32, height: f32, content: &str) -> Option<String> {
        let surface = self.session.surface_mut()?;
        let z_index = surface
            .document()
            .elements()
            .iter()
            .map(|e| e.geometry.z_index)
            .max()
            .map_or(0, |z| z.saturating_add(1));
        let kind = Element::text("", Geometry::default(), content).kind;
        surface
            .insert(Geometry::new(x, y, width, height, z_index), kind)
            .ok()
            .map(|id| id.to_string())
    }

    /// ID of the selected element, if any.
    #[wasm_bindgen(js_name = selectedId)]
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.session
            .surface()
            .and_then(|s| s.selection())
            .map(ToString::to_string)
    }

    /// Undo the last edit.
    pub fn undo(&mut self) -> bool {
        self.session.surface_mut().is_some_and(|s| s.undo())
    }

    /// Redo the last undone edit.
    pub fn redo(&mut self) -> bool {
        self.session.surface_mut().is_some_and(|s| s.redo())
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session
            .surface()
            .is_some_and(|s| s.history().can_undo())
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session
            .surface()
            .is_some_and(|s| s.history().can_redo())
    }
}

impl WasmEditor {
    fn dispatch(&mut self, event: &InputEvent) -> bool {
        self.session
            .surface_mut()
            .is_some_and(|s| s.handle_event(event) != SurfaceResponse::Unchanged)
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u64 {
    crate::store::current_timestamp_ms()
}
