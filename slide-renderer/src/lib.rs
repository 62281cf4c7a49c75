//! # Slidecraft Renderer
//!
//! Turns scene documents into files and slide images into backgrounds.
//!
//! ## Outputs
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              SceneDocument                  │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ Raster      │ HTML        │ JSON            │
//! │ SVG → PNG   │ standalone  │ raw document    │
//! │ (resvg)     │ page        │                 │
//! └─────────────┴─────────────┴─────────────────┘
//! ```
//!
//! The [`inpaint`] module holds the local text-removal fallback used when no
//! external service can produce a clean background.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod error;
pub mod html;
pub mod image;
pub mod inpaint;
pub mod layout;

#[cfg(feature = "export")]
pub mod export;

pub use artifact::{ExportArtifact, ExportFormat};
pub use error::{ExportError, ExportResult};
pub use html::export_html;
pub use inpaint::inpaint_text_regions;

#[cfg(feature = "export")]
pub use export::{ExportConfig, SlideExporter};

use slide_core::SceneDocument;

/// Serialize a document as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_json(document: &SceneDocument) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
