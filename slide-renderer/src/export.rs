//! Raster export.
//!
//! Renders a slide to PNG, JPEG, or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline. The input
//! is a render plan: the painted layers of the canvas, with the opacity they
//! are displayed at. Output is always the full 1920x1080 canvas at scale 1.

use std::fmt::Write;

use image::ImageEncoder;
use slide_core::{render_plan, ElementKind, RenderLayer, SceneDocument, ShapeKind};

use crate::artifact::{ExportArtifact, ExportFormat};
use crate::error::{ExportError, ExportResult};
use crate::layout::{
    chart_label, line_height_px, resolve_image_source, ImageSource, CHART_PLACEHOLDER_BORDER,
    CHART_PLACEHOLDER_FILL, CHART_PLACEHOLDER_TEXT, IMAGE_PLACEHOLDER_BORDER,
    IMAGE_PLACEHOLDER_FILL, IMAGE_PLACEHOLDER_TEXT, TEXT_PADDING,
};

/// Configuration for raster export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Color under the slide, as RGBA bytes. Also the JPEG matte.
    pub background: [u8; 4],
    /// Load system fonts for text rendering.
    pub load_system_fonts: bool,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: [255, 255, 255, 255],
            load_system_fonts: true,
            jpeg_quality: 85,
        }
    }
}

/// Exports slides to image formats.
#[derive(Debug, Clone, Default)]
pub struct SlideExporter {
    config: ExportConfig,
}

impl SlideExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Export a document to a named file artifact.
    ///
    /// Raster formats render the document's default render plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be rendered or encoded.
    pub fn export(
        &self,
        document: &SceneDocument,
        format: ExportFormat,
    ) -> ExportResult<ExportArtifact> {
        let bytes = match format {
            ExportFormat::Png => self.render_to_png(document, &render_plan(document))?,
            ExportFormat::Jpeg => self.render_to_jpeg(document, &render_plan(document))?,
            ExportFormat::Svg => self
                .render_to_svg(document, &render_plan(document))
                .into_bytes(),
            ExportFormat::Html => crate::html::export_html(document).into_bytes(),
            ExportFormat::Json => crate::export_json(document)?.into_bytes(),
        };
        Ok(ExportArtifact::timestamped(format, bytes))
    }

    /// Render layers to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(
        &self,
        document: &SceneDocument,
        layers: &[RenderLayer],
    ) -> ExportResult<Vec<u8>> {
        let svg = self.render_to_svg(document, layers);
        let pixmap = self.rasterize_svg(&svg)?;

        pixmap
            .encode_png()
            .map_err(|e| ExportError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Render layers to JPEG bytes, flattened onto the configured background.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(
        &self,
        document: &SceneDocument,
        layers: &[RenderLayer],
    ) -> ExportResult<Vec<u8>> {
        let svg = self.render_to_svg(document, layers);
        let pixmap = self.rasterize_svg(&svg)?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = &self.config.background;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // tiny-skia pixels are premultiplied.
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for channel in 0..3 {
                let value = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
                rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| ExportError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Render layers to an SVG string of the full canvas.
    #[must_use]
    pub fn render_to_svg(&self, document: &SceneDocument, layers: &[RenderLayer]) -> String {
        let (width, height) = document.canvas_size();

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        );

        let bg = &self.config.background;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgb({},{},{})\" fill-opacity=\"{}\"/>",
            bg[0],
            bg[1],
            bg[2],
            f32::from(bg[3]) / 255.0,
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(document.effective_background_color()),
        );
        if let Some(image) = document.background_image() {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
                escape_xml(image.as_str()),
            );
        }

        for layer in layers {
            render_layer_svg(&mut svg, document, layer);
        }

        svg.push_str("</svg>");
        svg
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> ExportResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        if self.config.load_system_fonts {
            opt.fontdb_mut().load_system_fonts();
        }
        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| ExportError::Svg(e.to_string()))?;

        let px_w = tree.size().width().round() as u32;
        let px_h = tree.size().height().round() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| ExportError::Rasterize("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Render a single layer to SVG.
fn render_layer_svg(svg: &mut String, document: &SceneDocument, layer: &RenderLayer) {
    let element = &layer.element;
    let g = &element.geometry;
    let (cx, cy) = (g.x + g.width / 2.0, g.y + g.height / 2.0);

    let _ = write!(svg, "<g opacity=\"{}\"", layer.opacity);
    if let Some(rotation) = g.rotation.filter(|r| *r != 0.0) {
        let _ = write!(svg, " transform=\"rotate({rotation} {cx} {cy})\"");
    }
    svg.push('>');

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
            let line_px = line_height_px(*font_size, *line_height);
            let lines: Vec<&str> = content.split('\n').collect();
            #[allow(clippy::cast_precision_loss)]
            let block = line_px * lines.len() as f32;
            // Lines are centered vertically in the padded box.
            let top = g.y + TEXT_PADDING + (g.height - TEXT_PADDING * 2.0 - block) / 2.0;
            let (x, anchor) = match text_align {
                slide_core::TextAlign::Left => (g.x + TEXT_PADDING, "start"),
                slide_core::TextAlign::Center => (cx, "middle"),
                slide_core::TextAlign::Right => (g.right() - TEXT_PADDING, "end"),
            };

            let _ = write!(
                svg,
                "<text font-size=\"{font_size}\" font-family=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"central\" xml:space=\"preserve\"",
                escape_xml(font_family),
                font_weight.as_css(),
                escape_xml(color),
            );
            if let Some(spacing) = letter_spacing {
                let _ = write!(svg, " letter-spacing=\"{spacing}\"");
            }
            svg.push('>');
            for (i, line) in lines.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let y = top + line_px * (i as f32 + 0.5);
                let _ = write!(svg, "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>", escape_xml(line));
            }
            svg.push_str("</text>");
        }

        ElementKind::Shape {
            shape_type,
            background_color,
            border_color,
            border_width,
            border_radius,
            opacity,
        } => {
            let stroke_width = border_width.unwrap_or(0.0).max(0.0);
            let inset = stroke_width / 2.0;
            let mut paint = format!(
                "fill=\"{}\" fill-opacity=\"{}\"",
                escape_xml(background_color),
                opacity.unwrap_or(1.0)
            );
            if stroke_width > 0.0 {
                let _ = write!(
                    paint,
                    " stroke=\"{}\" stroke-width=\"{stroke_width}\" stroke-opacity=\"{}\"",
                    escape_xml(border_color.as_deref().unwrap_or("#000000")),
                    opacity.unwrap_or(1.0)
                );
            }
            match shape_type {
                ShapeKind::Circle | ShapeKind::Ellipse => {
                    let _ = write!(
                        svg,
                        "<ellipse cx=\"{cx}\" cy=\"{cy}\" rx=\"{}\" ry=\"{}\" {paint}/>",
                        (g.width / 2.0 - inset).max(0.0),
                        (g.height / 2.0 - inset).max(0.0),
                    );
                }
                ShapeKind::Rectangle | ShapeKind::Polygon => {
                    let _ = write!(
                        svg,
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" {paint}/>",
                        g.x + inset,
                        g.y + inset,
                        (g.width - stroke_width).max(0.0),
                        (g.height - stroke_width).max(0.0),
                        border_radius.unwrap_or(0.0).max(0.0),
                    );
                }
            }
        }

        ElementKind::Image { src, opacity } => {
            let _ = write!(svg, "<g opacity=\"{}\">", opacity.unwrap_or(1.0));
            match resolve_image_source(src, document) {
                ImageSource::Own(href) => {
                    let _ = write!(
                        svg,
                        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\" href=\"{}\"/>",
                        g.x,
                        g.y,
                        g.width,
                        g.height,
                        escape_xml(href),
                    );
                }
                ImageSource::Crop(original) => {
                    let (width, height) = document.canvas_size();
                    let _ = write!(
                        svg,
                        "<svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\"><image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" href=\"{}\"/></svg>",
                        g.x,
                        g.y,
                        g.width,
                        g.height,
                        g.x,
                        g.y,
                        g.width,
                        g.height,
                        escape_xml(original.as_str()),
                    );
                }
                ImageSource::Placeholder => {
                    placeholder_svg(
                        svg,
                        g,
                        IMAGE_PLACEHOLDER_FILL,
                        IMAGE_PLACEHOLDER_BORDER,
                        " stroke-width=\"2\" stroke-dasharray=\"6 4\"",
                        IMAGE_PLACEHOLDER_TEXT,
                        12.0,
                        "Image",
                    );
                }
            }
            svg.push_str("</g>");
        }

        ElementKind::Chart {
            chart_type,
            fallback_image,
        } => match fallback_image.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(href) => {
                let _ = write!(
                    svg,
                    "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" href=\"{}\"/>",
                    g.x,
                    g.y,
                    g.width,
                    g.height,
                    escape_xml(href),
                );
            }
            None => {
                placeholder_svg(
                    svg,
                    g,
                    CHART_PLACEHOLDER_FILL,
                    CHART_PLACEHOLDER_BORDER,
                    " stroke-width=\"1\"",
                    CHART_PLACEHOLDER_TEXT,
                    14.0,
                    &chart_label(chart_type),
                );
            }
        },
    }

    svg.push_str("</g>");
}

/// Render a bordered block with a centered label.
#[allow(clippy::too_many_arguments)]
fn placeholder_svg(
    svg: &mut String,
    g: &slide_core::Geometry,
    fill: &str,
    stroke: &str,
    stroke_attrs: &str,
    text_color: &str,
    font_size: f32,
    label: &str,
) {
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\"{stroke_attrs}/>",
        g.x, g.y, g.width, g.height,
    );
    let _ = write!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-size=\"{font_size}\" fill=\"{text_color}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"sans-serif\">{}</text>",
        g.x + g.width / 2.0,
        g.y + g.height / 2.0,
        escape_xml(label),
    );
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
