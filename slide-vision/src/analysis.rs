//! Analysis adapter: slide image in, scene document out.
//!
//! The vision model is asked for a single JSON object describing every
//! element on the slide. The answer is cleaned, validated and turned into a
//! [`SceneDocument`] carrying the analyzed image as its original.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use slide_core::{ImageRef, SceneDocument, DEFAULT_BACKGROUND_COLOR, DEFAULT_PAGE_ID};
use thiserror::Error;

use crate::service::{with_timeout, ServiceError, VisionService};

/// Instruction sent with every slide image.
pub const ANALYSIS_PROMPT: &str = r##"You are an expert presentation design analyst. Analyze this slide image (assume a resolution of 1920x1080), extract every visual element, and output the result as JSON.

Requirements:
1. Identify all text, shape, image, icon and chart elements.
2. Measure each element's position (x, y) and size (width, height) in pixels on the 1920x1080 canvas as precisely as possible.
3. For text elements:
   - Extract the full text content, font size, font weight, color and alignment.
   - IMPORTANT: the text box height must be large enough to show all of the text.
   - Compute height as font size x number of lines x 1.4 (line height), plus at least 10% margin.
4. For image and icon elements:
   - IMPORTANT: do not try to extract base64 data or URLs.
   - Mark them as type "image" with accurate position and size.
   - Set the src field to an empty string "".
5. Identify shape type, background color, border color and corner radius.
6. Assign zIndex from bottom to top (background elements 0, topmost element highest).
7. Use hexadecimal colors (for example #FF0000).
8. Give every element a unique id (elem_1, elem_2, ...).

Output format (must be valid JSON):
{
  "id": "page_1",
  "width": 1920,
  "height": 1080,
  "backgroundColor": "#FFFFFF",
  "elements": [
    {"id": "elem_1", "type": "text", "x": 100, "y": 200, "width": 500, "height": 60, "zIndex": 5,
     "content": "Title", "fontSize": 48, "fontFamily": "Arial", "fontWeight": "bold",
     "color": "#333333", "textAlign": "center"},
    {"id": "elem_2", "type": "shape", "x": 50, "y": 50, "width": 1820, "height": 980, "zIndex": 0,
     "shapeType": "rectangle", "backgroundColor": "#F0F0F0", "borderRadius": 10},
    {"id": "elem_3", "type": "image", "x": 800, "y": 400, "width": 120, "height": 120, "zIndex": 3,
     "src": ""}
  ]
}

Output only the JSON object with no other commentary. The src field of image elements must always be ""."##;

/// Errors produced while analyzing a slide.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The vision service failed.
    #[error("vision service failed: {0}")]
    Service(#[from] ServiceError),

    /// The answer was not valid JSON.
    #[error("malformed analysis response: {0}")]
    Malformed(String),

    /// The answer was JSON but not a valid slide description.
    #[error("invalid analysis response: {0}")]
    Schema(String),
}

/// Analysis adapter configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Limit on a single vision request.
    pub timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

/// Turns slide images into scene documents through a vision service.
#[derive(Clone)]
pub struct AnalysisAdapter {
    service: Arc<dyn VisionService>,
    config: AnalysisConfig,
}

impl std::fmt::Debug for AnalysisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalysisAdapter {
    /// Create an adapter over `service`.
    #[must_use]
    pub fn new(service: Arc<dyn VisionService>, config: AnalysisConfig) -> Self {
        Self { service, config }
    }

    /// Analyze `image` into a document whose original image is `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails or times out, or if its answer
    /// is not a valid slide description.
    pub async fn analyze(&self, image: &ImageRef) -> Result<SceneDocument, AnalysisError> {
        tracing::info!("Analyzing slide image ({} bytes)", image.len());
        let text = with_timeout(
            self.config.timeout,
            self.service.analyze_image(ANALYSIS_PROMPT, image),
        )
        .await
        .inspect_err(|e| tracing::error!("Slide analysis failed: {e}"))?;
        tracing::debug!("Analysis response: {} characters", text.len());

        let document = parse_analysis_response(&text, image)?;
        tracing::info!("Analysis complete: {} elements", document.element_count());
        for (idx, element) in document.elements().iter().enumerate() {
            let g = &element.geometry;
            tracing::debug!(
                "  [{idx}] {} {} at ({}, {}) size {}x{}",
                element.kind.type_name(),
                element.id,
                g.x,
                g.y,
                g.width,
                g.height
            );
        }
        Ok(document)
    }
}

/// Remove a surrounding Markdown code fence, if any.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse a vision answer into a scene document.
///
/// Canvas size is always 1920x1080 whatever the answer claims. Missing page
/// ids and background colors take their defaults. Elements without an id get
/// one, repeated ids are made unique, and elements that do not describe a
/// known element type are dropped.
///
/// # Errors
///
/// Returns [`AnalysisError::Malformed`] for invalid JSON and
/// [`AnalysisError::Schema`] when the answer is not an object or has no
/// `elements` array.
pub fn parse_analysis_response(
    text: &str,
    original: &ImageRef,
) -> Result<SceneDocument, AnalysisError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| AnalysisError::Malformed(e.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(AnalysisError::Schema("response is not a JSON object".to_string()));
    };
    let Some(Value::Array(raw_elements)) = root.remove("elements") else {
        return Err(AnalysisError::Schema("missing elements array".to_string()));
    };

    let mut seen = HashSet::new();
    let mut elements = Vec::with_capacity(raw_elements.len());
    for (idx, raw) in raw_elements.into_iter().enumerate() {
        let Value::Object(mut object) = raw else {
            tracing::warn!("Skipping non-object element at index {idx}");
            continue;
        };
        let id = unique_id(&object, idx, &mut seen);
        object.insert("id".to_string(), Value::String(id.clone()));

        match serde_json::from_value::<slide_core::Element>(Value::Object(object.clone())) {
            Ok(_) => elements.push(Value::Object(object)),
            Err(e) => {
                seen.remove(&id);
                tracing::warn!("Skipping unrecognized element {id}: {e}");
            }
        }
    }

    let mut document = Map::new();
    document.insert(
        "id".to_string(),
        Value::String(non_empty_str(&root, "id").unwrap_or(DEFAULT_PAGE_ID).to_string()),
    );
    document.insert(
        "backgroundColor".to_string(),
        Value::String(
            non_empty_str(&root, "backgroundColor")
                .unwrap_or(DEFAULT_BACKGROUND_COLOR)
                .to_string(),
        ),
    );
    document.insert("elements".to_string(), Value::Array(elements));

    let document: SceneDocument = serde_json::from_value(Value::Object(document))
        .map_err(|e| AnalysisError::Schema(e.to_string()))?;
    Ok(document.with_original_image(original.clone()))
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The element's id, or a generated one, made unique among `seen`.
fn unique_id(object: &Map<String, Value>, idx: usize, seen: &mut HashSet<String>) -> String {
    let base = match object.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => format!("elem_{n}"),
        _ => format!("elem_{}", idx + 1),
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while seen.contains(&candidate) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    if candidate != base {
        tracing::warn!("Renamed duplicate element id {base} to {candidate}");
    }
    seen.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_core::{ElementKind, FontWeight, ShapeKind};

    fn original() -> ImageRef {
        ImageRef::from("data:image/png;base64,iVBORw0KGgo=")
    }

    const RESPONSE: &str = r##"{
        "id": "page_7",
        "width": 1280,
        "height": 720,
        "backgroundColor": "#101010",
        "elements": [
            {"id": "elem_1", "type": "text", "x": 100, "y": 200, "width": 500, "height": 60,
             "zIndex": 5, "content": "Title", "fontSize": 48, "fontWeight": "bold",
             "color": "#333333", "textAlign": "center"},
            {"id": "elem_2", "type": "shape", "x": 0, "y": 0, "width": 1920, "height": 1080,
             "zIndex": 0, "shapeType": "rectangle", "backgroundColor": "#F0F0F0"}
        ]
    }"##;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_parse_valid_response() {
        let doc = parse_analysis_response(RESPONSE, &original()).expect("parse");
        assert_eq!(doc.id(), "page_7");
        assert_eq!(doc.canvas_size(), (1920, 1080));
        assert_eq!(doc.background_color(), Some("#101010"));
        assert_eq!(doc.original_image(), Some(&original()));
        assert!(doc.background_image().is_none());
        assert_eq!(doc.element_count(), 2);

        let title = doc.element(&"elem_1".into()).expect("title");
        match &title.kind {
            ElementKind::Text {
                content,
                font_weight,
                ..
            } => {
                assert_eq!(content, "Title");
                assert_eq!(*font_weight, FontWeight::Bold);
            }
            other => panic!("expected text, got {other:?}"),
        }
        let panel = doc.element(&"elem_2".into()).expect("panel");
        assert!(matches!(
            panel.kind,
            ElementKind::Shape {
                shape_type: ShapeKind::Rectangle,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_fenced_response() {
        let fenced = format!("```json\n{RESPONSE}\n```");
        let doc = parse_analysis_response(&fenced, &original()).expect("parse");
        assert_eq!(doc.element_count(), 2);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc = parse_analysis_response(r#"{"elements": []}"#, &original()).expect("parse");
        assert_eq!(doc.id(), "page_1");
        assert_eq!(doc.background_color(), Some("#FFFFFF"));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_missing_elements_is_schema_error() {
        let err = parse_analysis_response(r#"{"id": "p"}"#, &original()).expect_err("schema");
        assert!(matches!(err, AnalysisError::Schema(ref m) if m.contains("missing elements")));

        let err = parse_analysis_response(r#"{"elements": {}}"#, &original()).expect_err("schema");
        assert!(matches!(err, AnalysisError::Schema(_)));

        let err = parse_analysis_response("[1, 2]", &original()).expect_err("schema");
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_analysis_response("Sorry, I can't help", &original()).expect_err("bad");
        assert!(matches!(err, AnalysisError::Malformed(_)));
    }

    #[test]
    fn test_duplicate_and_missing_ids_are_repaired() {
        let response = r#"{"elements": [
            {"id": "a", "type": "image", "x": 0, "y": 0, "width": 10, "height": 10, "zIndex": 1, "src": ""},
            {"id": "a", "type": "image", "x": 5, "y": 5, "width": 10, "height": 10, "zIndex": 2, "src": ""},
            {"type": "image", "x": 9, "y": 9, "width": 10, "height": 10, "zIndex": 3, "src": ""}
        ]}"#;
        let doc = parse_analysis_response(response, &original()).expect("parse");
        let ids: Vec<&str> = doc.elements().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a_2", "elem_3"]);
    }

    #[test]
    fn test_unknown_element_types_are_dropped() {
        let response = r#"{"elements": [
            {"id": "v", "type": "video", "x": 0, "y": 0, "width": 10, "height": 10, "zIndex": 1},
            {"id": "t", "type": "text", "x": 0, "y": 0, "width": 10, "height": 10, "zIndex": 1, "content": "ok"}
        ]}"#;
        let doc = parse_analysis_response(response, &original()).expect("parse");
        assert_eq!(doc.element_count(), 1);
        assert!(doc.contains(&"t".into()));
    }
}
