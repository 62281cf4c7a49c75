//! Standalone HTML export.
//!
//! Produces a self-contained page holding a fixed 1920x1080 container with
//! one absolutely positioned block per element. Geometry is written with the
//! shortest exact decimal form of each value, so parsing the styles back
//! yields the original numbers.

use std::fmt::Write;

use slide_core::{Element, ElementKind, Geometry, SceneDocument};

use crate::layout::{
    chart_label, resolve_image_source, ImageSource, CHART_PLACEHOLDER_BORDER,
    CHART_PLACEHOLDER_FILL, CHART_PLACEHOLDER_TEXT, DEFAULT_LINE_HEIGHT, IMAGE_PLACEHOLDER_BORDER,
    IMAGE_PLACEHOLDER_FILL, IMAGE_PLACEHOLDER_TEXT, TEXT_PADDING,
};

/// Language tag of the exported page.
pub const HTML_LANG: &str = "en";

/// Render a document as a standalone HTML page.
#[must_use]
pub fn export_html(document: &SceneDocument) -> String {
    let (width, height) = document.canvas_size();

    let mut background = format!(
        "background: {};",
        css_value(document.effective_background_color())
    );
    if let Some(image) = document.background_image() {
        let _ = write!(
            background,
            " background-image: url('{}');",
            css_url(image.as_str())
        );
    }

    let mut elements = String::new();
    for element in document.elements() {
        elements.push_str("    ");
        render_element(&mut elements, document, element);
        elements.push('\n');
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="{HTML_LANG}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Slide {title}</title>
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ display: flex; justify-content: center; align-items: center; min-height: 100vh; background: #2a2a2a; padding: 20px; }}
    .ppt-container {{ position: relative; width: {width}px; height: {height}px; {background} background-size: cover; background-position: center; box-shadow: 0 10px 40px rgba(0, 0, 0, 0.3); }}
    .element {{ position: absolute; }}
    .text-element {{ display: flex; align-items: center; padding: {TEXT_PADDING}px; overflow: hidden; white-space: pre-wrap; word-wrap: break-word; }}
    .text-element > div {{ width: 100%; }}
    .fill {{ width: 100%; height: 100%; }}
    .round {{ border-radius: 50%; }}
    .image-element {{ width: 100%; height: 100%; object-fit: cover; }}
    .chart-element {{ width: 100%; height: 100%; object-fit: contain; }}
    .placeholder {{ display: flex; align-items: center; justify-content: center; }}
    @media (max-width: {width}px) {{
      .ppt-container {{ transform: scale(calc(100vw / {width})); transform-origin: top left; }}
    }}
  </style>
</head>
<body>
  <div class="ppt-container">
{elements}  </div>
</body>
</html>
"#,
        title = escape_html(document.id()),
    )
}

/// Position, size, stacking and rotation of an element's outer block.
fn base_style(g: &Geometry) -> String {
    let mut style = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px; z-index: {};",
        g.x, g.y, g.width, g.height, g.z_index
    );
    if let Some(rotation) = g.rotation.filter(|r| *r != 0.0) {
        let _ = write!(style, " transform: rotate({rotation}deg);");
    }
    style
}

fn render_element(out: &mut String, document: &SceneDocument, element: &Element) {
    let g = &element.geometry;
    let base = base_style(g);
    let id = escape_html(element.id.as_str());

    match &element.kind {
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
            let mut style = format!(
                "{base} font-size: {font_size}px; font-family: {}; font-weight: {}; color: {}; text-align: {}; line-height: {};",
                attr_css_value(font_family),
                font_weight.as_css(),
                attr_css_value(color),
                text_align.as_css(),
                line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
            );
            if let Some(spacing) = letter_spacing {
                let _ = write!(style, " letter-spacing: {spacing}px;");
            }
            let _ = write!(
                out,
                r#"<div class="element text-element" data-id="{id}" style="{style}"><div>{}</div></div>"#,
                escape_html(content),
            );
        }

        ElementKind::Shape {
            shape_type,
            background_color,
            border_color,
            border_width,
            border_radius,
            opacity,
        } => {
            let class = if shape_type.is_round() { "fill round" } else { "fill" };
            let mut style = format!("background-color: {};", attr_css_value(background_color));
            if let Some(color) = border_color {
                let _ = write!(style, " border-color: {};", attr_css_value(color));
            }
            if let Some(width) = border_width.filter(|w| *w > 0.0) {
                let _ = write!(style, " border-width: {width}px; border-style: solid;");
            }
            if let Some(radius) = border_radius.filter(|r| *r > 0.0 && !shape_type.is_round()) {
                let _ = write!(style, " border-radius: {radius}px;");
            }
            if let Some(opacity) = opacity {
                let _ = write!(style, " opacity: {opacity};");
            }
            let _ = write!(
                out,
                r#"<div class="element" data-id="{id}" style="{base}"><div class="{class}" style="{style}"></div></div>"#,
            );
        }

        ElementKind::Image { src, opacity } => {
            let opacity = opacity.map(|o| format!(" opacity: {o};")).unwrap_or_default();
            match resolve_image_source(src, document) {
                ImageSource::Own(href) => {
                    let _ = write!(
                        out,
                        r#"<div class="element" data-id="{id}" style="{base}"><img src="{}" class="image-element" style="{}" alt="Slide image"></div>"#,
                        escape_html(href),
                        opacity.trim_start(),
                    );
                }
                ImageSource::Crop(original) => {
                    let (width, height) = document.canvas_size();
                    let _ = write!(
                        out,
                        r#"<div class="element" data-id="{id}" style="{base} background-image: url('{}'); background-position: {}px {}px; background-size: {width}px {height}px; background-repeat: no-repeat;{opacity}"></div>"#,
                        escape_html(&css_url(original.as_str())),
                        // Subtracting from zero keeps a zero offset from printing as `-0`.
                        0.0 - g.x,
                        0.0 - g.y,
                    );
                }
                ImageSource::Placeholder => {
                    let _ = write!(
                        out,
                        r#"<div class="element placeholder" data-id="{id}" style="{base} background: {IMAGE_PLACEHOLDER_FILL}; border: 2px dashed {IMAGE_PLACEHOLDER_BORDER}; font-size: 12px; color: {IMAGE_PLACEHOLDER_TEXT};{opacity}">Image</div>"#,
                    );
                }
            }
        }

        ElementKind::Chart {
            chart_type,
            fallback_image,
        } => {
            let label = escape_html(&chart_label(chart_type));
            match fallback_image.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(href) => {
                    let _ = write!(
                        out,
                        r#"<div class="element" data-id="{id}" style="{base}"><img src="{}" class="chart-element" alt="{label}"></div>"#,
                        escape_html(href),
                    );
                }
                None => {
                    let _ = write!(
                        out,
                        r#"<div class="element placeholder" data-id="{id}" style="{base} background: {CHART_PLACEHOLDER_FILL}; border: 1px solid {CHART_PLACEHOLDER_BORDER}; font-size: 14px; color: {CHART_PLACEHOLDER_TEXT};"><div>{label}</div></div>"#,
                    );
                }
            }
        }
    }
}

/// Escape text for HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip characters that could end a bare CSS declaration.
fn css_value(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\\' | '\n' | '\r'))
        .collect()
}

fn attr_css_value(input: &str) -> String {
    escape_html(&css_value(input))
}

/// Escape a URL for a single-quoted CSS `url()`.
fn css_url(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '<' => out.push_str("\\3C "),
            '\n' | '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
