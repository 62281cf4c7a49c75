//! Input events for the editing surface.
//!
//! Pointer coordinates are in *view* space (scaled canvas pixels, relative to
//! the top-left corner of the displayed canvas). The surface converts them to
//! canvas space through its [`ViewTransform`](crate::ViewTransform).

use serde::{Deserialize, Serialize};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Gesture aborted by the host (focus loss, pointer capture lost).
    Cancel,
}

/// A pointer (mouse, pen or primary touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in view coordinates.
    pub x: f32,
    /// Y position in view coordinates.
    pub y: f32,
    /// Mouse button (0 = left, 1 = middle, 2 = right).
    #[serde(default)]
    pub button: u8,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create a primary-button pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            button: 0,
            timestamp_ms: 0,
        }
    }

    /// Primary button pressed at a view position.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer moved to a view position.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Primary button released at a view position.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Whether this is the primary (left) button.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.button == 0
    }
}

/// All input events the editing surface can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer event.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key {
        /// Key name (`"z"`, `"Delete"`, `"Escape"`, ...).
        key: String,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },
}

impl InputEvent {
    /// Key press with the given modifiers.
    #[must_use]
    pub fn key(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self::Key {
            key: key.into(),
            pressed: true,
            modifiers,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    #[serde(default)]
    pub shift: bool,
    /// Control key pressed.
    #[serde(default)]
    pub ctrl: bool,
    /// Alt/Option key pressed.
    #[serde(default)]
    pub alt: bool,
    /// Meta/Command key pressed.
    #[serde(default)]
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Only the command modifier.
    #[must_use]
    pub const fn cmd() -> Self {
        Self {
            shift: false,
            ctrl: true,
            alt: false,
            meta: false,
        }
    }

    /// Command plus shift.
    #[must_use]
    pub const fn cmd_shift() -> Self {
        Self {
            shift: true,
            ctrl: true,
            alt: false,
            meta: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_json() {
        let event = InputEvent::Pointer(PointerEvent::down(10.0, 20.0));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "Pointer");
        assert_eq!(json["data"]["phase"], "down");

        let parsed: InputEvent = serde_json::from_str(
            r#"{"type":"Pointer","data":{"phase":"move","x":1,"y":2}}"#,
        )
        .expect("parse");
        assert_eq!(parsed, InputEvent::Pointer(PointerEvent::moved(1.0, 2.0)));
    }

    #[test]
    fn test_command_modifier() {
        let meta = KeyModifiers {
            meta: true,
            ..KeyModifiers::default()
        };
        assert!(meta.command());
        assert!(KeyModifiers::cmd().command());
        assert!(!KeyModifiers::default().command());
    }
}
