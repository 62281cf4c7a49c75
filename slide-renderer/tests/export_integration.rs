//! Integration tests for slide export (slide-renderer).
//!
//! Tests HTML geometry fidelity, raster output size, artifact files, and
//! that exporting never changes the document.

use slide_core::{
    render_plan, Element, ElementKind, Geometry, ImageRef, SceneDocument, ShapeKind,
};
use slide_renderer::export::{ExportConfig, SlideExporter};
use slide_renderer::image::{load_image_from_bytes, png_data_uri};
use slide_renderer::{export_html, export_json, ExportFormat};

/// A single parsed element block from exported HTML.
#[derive(Debug, PartialEq)]
struct Block {
    id: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    z_index: i32,
}

/// Read the number between `key: ` and `unit` in a style string.
fn style_value<'a>(style: &'a str, key: &str, unit: &str) -> &'a str {
    let start = style.find(&format!("{key}: ")).expect("style key") + key.len() + 2;
    let rest = &style[start..];
    &rest[..rest.find(unit).expect("style unit")]
}

/// Parse every `data-id` block of an exported page.
fn parse_blocks(html: &str) -> Vec<Block> {
    html.split("data-id=\"")
        .skip(1)
        .map(|chunk| {
            let id_end = chunk.find('"').expect("id end");
            let style_start = chunk.find("style=\"").expect("style") + 7;
            let style = &chunk[style_start..];
            let style = &style[..style.find('"').expect("style end")];
            Block {
                id: chunk[..id_end].to_string(),
                x: style_value(style, "left", "px").parse().expect("left"),
                y: style_value(style, "top", "px").parse().expect("top"),
                width: style_value(style, "width", "px").parse().expect("width"),
                height: style_value(style, "height", "px").parse().expect("height"),
                z_index: style_value(style, "z-index", ";").parse().expect("z-index"),
            }
        })
        .collect()
}

fn exporter() -> SlideExporter {
    SlideExporter::new(ExportConfig {
        load_system_fonts: false,
        ..ExportConfig::default()
    })
}

/// A document with one element of every kind and awkward coordinates.
fn sample_document() -> SceneDocument {
    let original = png_data_uri(&image::RgbaImage::from_pixel(
        192,
        108,
        image::Rgba([40, 80, 120, 255]),
    ))
    .expect("encode original");

    SceneDocument::new("page_1")
        .with_background_color("#EEEEEE")
        .with_original_image(original)
        .with_element(Element::text(
            "title",
            Geometry::new(100.25, 80.5, 1200.0, 96.75, 10),
            "Quarterly <Results> & \"Outlook\"",
        ))
        .and_then(|d| {
            d.with_element(Element::shape(
                "badge",
                Geometry::new(1700.0, 40.0, 120.0, 120.0, 2),
                ShapeKind::Circle,
                "#FF6600",
            ))
        })
        .and_then(|d| {
            d.with_element(Element::image(
                "photo",
                Geometry::new(0.1, 0.2, 640.3, 360.7, 1),
                "",
            ))
        })
        .and_then(|d| {
            d.with_element(Element::new(
                "sales",
                Geometry::new(960.0, 540.0, 800.0, 400.0, -1),
                ElementKind::Chart {
                    chart_type: "line".to_string(),
                    fallback_image: None,
                },
            ))
        })
        .expect("build document")
}

// ==========================================================================
// HTML export
// ==========================================================================

#[test]
fn test_html_geometry_round_trip_is_exact() {
    let doc = sample_document();
    let blocks = parse_blocks(&export_html(&doc));

    assert_eq!(blocks.len(), doc.element_count());
    for (block, element) in blocks.iter().zip(doc.elements()) {
        let g = &element.geometry;
        assert_eq!(block.id, element.id.as_str());
        assert_eq!(
            (block.x, block.y, block.width, block.height, block.z_index),
            (g.x, g.y, g.width, g.height, g.z_index),
            "geometry of {}",
            block.id
        );
    }
}

#[test]
fn test_html_escapes_all_text() {
    let html = export_html(&sample_document());
    assert!(html.contains("Quarterly &lt;Results&gt; &amp; &quot;Outlook&quot;"));
    assert!(!html.contains("<Results>"));
}

#[test]
fn test_html_is_standalone_page() {
    let html = export_html(&sample_document());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("width: 1920px; height: 1080px;"));
    assert!(html.contains("@media (max-width: 1920px)"));
    assert!(html.contains("LINE Chart"));
    // The photo has no source, so it crops the original slide.
    assert!(html.contains("background-position: -0.1px -0.2px;"));
}

// ==========================================================================
// Raster export
// ==========================================================================

#[test]
fn test_png_is_canvas_sized() {
    let doc = sample_document();
    let png = exporter()
        .render_to_png(&doc, &render_plan(&doc))
        .expect("png");
    let img = load_image_from_bytes(&png).expect("decode png");
    assert_eq!(img.dimensions(), (1920, 1080));
}

#[test]
fn test_png_shows_background_color() {
    let doc = SceneDocument::new("blank").with_background_color("#FF0000");
    let png = exporter()
        .render_to_png(&doc, &render_plan(&doc))
        .expect("png");
    let img = load_image_from_bytes(&png).expect("decode png");
    assert_eq!(img.get_pixel(960, 540).0, [255, 0, 0, 255]);
}

#[test]
fn test_png_paints_background_image() {
    let background = png_data_uri(&image::RgbaImage::from_pixel(
        16,
        9,
        image::Rgba([0, 255, 0, 255]),
    ))
    .expect("encode");
    let doc = SceneDocument::new("bg").with_background_image(background);
    let png = exporter()
        .render_to_png(&doc, &render_plan(&doc))
        .expect("png");
    let img = load_image_from_bytes(&png).expect("decode png");
    let pixel = img.get_pixel(960, 540).0;
    assert!(pixel[1] > 200 && pixel[0] < 50, "got {pixel:?}");
}

// ==========================================================================
// Artifacts
// ==========================================================================

#[test]
fn test_export_all_formats_to_directory() {
    let doc = sample_document();
    let dir = tempfile::tempdir().expect("tempdir");

    for format in [ExportFormat::Png, ExportFormat::Html, ExportFormat::Json] {
        let artifact = exporter().export(&doc, format).expect("export");
        let path = artifact.write_to(dir.path()).expect("write");
        assert!(path.exists());
        assert_eq!(
            path.extension().and_then(|e| e.to_str()),
            Some(format.extension())
        );
    }
}

#[test]
fn test_json_export_restores_document() {
    let doc = sample_document();
    let json = export_json(&doc).expect("json");
    let restored = SceneDocument::from_json(&json).expect("parse");
    assert_eq!(restored, doc);
}

#[test]
fn test_export_leaves_document_unchanged() {
    let doc = sample_document();
    let before = doc.clone();
    let _ = exporter().export(&doc, ExportFormat::Png).expect("png");
    let _ = exporter().export(&doc, ExportFormat::Html).expect("html");
    assert_eq!(doc, before);
}

#[test]
fn test_undecodable_background_image_is_skipped() {
    let doc = SceneDocument::new("p")
        .with_background_image(ImageRef::from("data:image/png;base64,!!!!"));
    // usvg skips undecodable images, so export still succeeds.
    let result = exporter().render_to_png(&doc, &render_plan(&doc));
    assert!(result.is_ok());
}
