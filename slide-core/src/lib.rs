//! # Slidecraft Core
//!
//! The editable slide model: a scene document of positioned text, shape,
//! image and chart elements on a fixed 1920x1080 canvas, a linear undo/redo
//! history over document snapshots, and the interactive editing surface that
//! turns pointer gestures into history entries.
//! Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 slide-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Scene Document  │  Editing Surface         │
//! │  - Elements      │  - View/canvas scale     │
//! │  - Patches       │  - Select/drag/resize    │
//! │  - JSON format   │  - Keyboard commands     │
//! ├─────────────────────────────────────────────┤
//! │  Edit History    │  Session & Store         │
//! │  - Undo/redo     │  - Cancellation tokens   │
//! │  - Step limit    │  - Saved presentations   │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod history;
pub mod patch;
pub mod session;
pub mod store;
pub mod surface;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use document::{
    ImageRef, SceneDocument, CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_BACKGROUND_COLOR, DEFAULT_PAGE_ID,
};
pub use element::{Element, ElementId, ElementKind, FontWeight, Geometry, ShapeKind, TextAlign};
pub use error::{SlideError, SlideResult};
pub use event::{InputEvent, KeyModifiers, PointerEvent, PointerPhase};
pub use history::EditHistory;
pub use patch::ElementPatch;
pub use session::{CancellationToken, EditorSession};
pub use store::{PresentationRecord, PresentationStore, StoreError};
pub use surface::{
    display_opacity, render_plan, EditingSurface, Interaction, Point, RenderLayer, ResizeHandle,
    SurfaceConfig, SurfaceResponse, ViewTransform,
};

/// Slide core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
