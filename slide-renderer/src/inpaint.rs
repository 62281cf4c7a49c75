//! Local text-removal fallback.
//!
//! When no external text-removal service is reachable, text regions of the
//! original slide are painted over with a flat color averaged from four
//! points just outside each box. The result is crude but always available.

use image::{Rgba, RgbaImage};
use slide_core::{Geometry, ImageRef};

use crate::error::ExportResult;
use crate::image::{fit_to_canvas, load_image_from_data_uri, png_data_uri};

/// Distance in pixels of the sample points from the box edges.
pub const SAMPLE_OFFSET: f32 = 5.0;

/// Padding in pixels added around each box when filling.
pub const FILL_PADDING: f32 = 5.0;

/// Remove text regions from a slide image.
///
/// The image is stretched to canvas size, each box in `regions` is filled in
/// order, and the result is returned as a PNG data URI.
///
/// # Errors
///
/// Returns an error if the original cannot be decoded or the result cannot
/// be encoded.
pub fn inpaint_text_regions(original: &ImageRef, regions: &[Geometry]) -> ExportResult<ImageRef> {
    let mut canvas = fit_to_canvas(load_image_from_data_uri(original.as_str())?);
    let filled = inpaint(&mut canvas, regions);
    tracing::debug!("Filled {filled} of {} text regions locally", regions.len());
    png_data_uri(&canvas)
}

/// Fill each region of `canvas` with the average of its boundary samples.
///
/// Regions are processed in order against the already-modified image.
/// Regions with no in-bounds sample are left untouched. Returns the number
/// of regions filled.
pub fn inpaint(canvas: &mut RgbaImage, regions: &[Geometry]) -> usize {
    let mut filled = 0;
    for region in regions {
        if let Some(color) = sample_boundary(canvas, region) {
            fill_rect(
                canvas,
                region.x - FILL_PADDING,
                region.y - FILL_PADDING,
                region.width + FILL_PADDING * 2.0,
                region.height + FILL_PADDING * 2.0,
                color,
            );
            filled += 1;
        }
    }
    filled
}

/// Average the in-bounds pixels at four points just outside `region`:
/// left and right of the top edge, above the left edge, below the left edge.
fn sample_boundary(canvas: &RgbaImage, region: &Geometry) -> Option<Rgba<u8>> {
    let points = [
        (region.x - SAMPLE_OFFSET, region.y),
        (region.right() + SAMPLE_OFFSET, region.y),
        (region.x, region.y - SAMPLE_OFFSET),
        (region.x, region.bottom() + SAMPLE_OFFSET),
    ];

    let mut sum = [0u32; 4];
    let mut count = 0u32;
    for (x, y) in points {
        if let Some(pixel) = pixel_at(canvas, x, y) {
            for (acc, channel) in sum.iter_mut().zip(pixel.0) {
                *acc += u32::from(channel);
            }
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(Rgba(sum.map(|total| rounded_div(total, count))))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_at(canvas: &RgbaImage, x: f32, y: f32) -> Option<Rgba<u8>> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let (px, py) = (x.floor() as u32, y.floor() as u32);
    if px < canvas.width() && py < canvas.height() {
        Some(*canvas.get_pixel(px, py))
    } else {
        None
    }
}

#[allow(clippy::cast_possible_truncation)]
fn rounded_div(total: u32, count: u32) -> u8 {
    ((total + count / 2) / count).min(255) as u8
}

/// Source-over fill of a rectangle, clipped to the image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
    #[allow(clippy::cast_precision_loss)]
    let (max_x, max_y) = (canvas.width() as f32, canvas.height() as f32);
    let clamp_x = |v: f32| v.round().clamp(0.0, max_x) as u32;
    let clamp_y = |v: f32| v.round().clamp(0.0, max_y) as u32;
    let (x0, x1) = (clamp_x(x), clamp_x(x + width));
    let (y0, y1) = (clamp_y(y), clamp_y(y + height));

    for py in y0..y1 {
        for px in x0..x1 {
            let dst = canvas.get_pixel_mut(px, py);
            *dst = blend_over(color, *dst);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    if sa >= 1.0 {
        return src;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let value = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
