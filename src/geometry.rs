//! Conversions between original-image space and the detector's input space.

use geo_types::{coord, Coord, Rect};
use image::imageops;

use crate::models::Detection;

/// Four corners of a detected text line, in detector-space pixels.
///
/// Corner order follows the detector: top-left, top-right, bottom-right, bottom-left.
pub type Quad = [Coord<f32>; 4];

/// Quads with a top or left edge shorter than this (in detector space) are discarded.
pub const MIN_EDGE_LENGTH: f32 = 5.0;

/// Scaling and filtering parameters shared by the detector and the box normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLineConfig {
    /// Target length of the shorter image side.
    pub scale: u32,
    /// Cap on the longer image side; wins over `scale` when both cannot hold.
    pub max_scale: u32,
    pub min_edge: f32,
}

impl TextLineConfig {
    pub const DEFAULT_SCALE: u32 = 600;
    pub const DEFAULT_MAX_SCALE: u32 = 1200;
}

impl Default for TextLineConfig {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            max_scale: Self::DEFAULT_MAX_SCALE,
            min_edge: MIN_EDGE_LENGTH,
        }
    }
}

/// Factor that brings the shorter side to `target_short`, unless that pushes the
/// longer side past `max_long`, in which case the longer side is capped instead.
///
/// Computed in `f64` so that descaled coordinates truncate the same way for every image size.
pub fn scale_factor(width: u32, height: u32, target_short: u32, max_long: u32) -> f64 {
    let short = width.min(height) as f64;
    let long = width.max(height) as f64;

    let f = target_short as f64 / short;
    if f * long > max_long as f64 {
        max_long as f64 / long
    } else {
        f
    }
}

/// Resizes `img` into detector space. Returns the resized image and the factor
/// used, so that `image_coord = detector_coord / factor`.
pub fn resize(
    img: &image::DynamicImage,
    target_short: u32,
    max_long: u32,
) -> (image::DynamicImage, f64) {
    let (width, height) = (img.width(), img.height());
    let f = scale_factor(width, height, target_short, max_long);

    let new_width = ((width as f64 * f).round() as u32).max(1);
    let new_height = ((height as f64 * f).round() as u32).max(1);

    let resized = img.resize_exact(new_width, new_height, imageops::FilterType::Triangle);

    (resized, f)
}

fn edge_length(a: Coord<f32>, b: Coord<f32>) -> f32 {
    let d = a - b;
    d.x.hypot(d.y)
}

/// Flattens a detector-space quad into an axis-aligned box in original-image pixels.
///
/// Rotation is discarded. Degenerate quads are filtered on their detector-space
/// edge lengths, before descaling.
pub fn quad_to_box(quad: &Quad, scale: f64, min_edge: f32) -> Option<Rect<i32>> {
    if edge_length(quad[0], quad[1]) < min_edge || edge_length(quad[3], quad[0]) < min_edge {
        return None;
    }

    let (x_min, x_max) = min_max(quad.map(|c| (c.x as f64 / scale) as i32));
    let (y_min, y_max) = min_max(quad.map(|c| (c.y as f64 / scale) as i32));

    if x_min == x_max || y_min == y_max {
        return None;
    }

    Some(Rect::new(
        coord! { x: x_min, y: y_min },
        coord! { x: x_max, y: y_max },
    ))
}

fn min_max(values: [i32; 4]) -> (i32, i32) {
    values
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Stable sort by `y_min`; every index-relative field lookup depends on this order.
pub fn sort_top_to_bottom(boxes: &mut [Rect<i32>]) {
    boxes.sort_by_key(|b| b.min().y);
}

/// Converts raw detections into sorted image-space boxes.
pub fn normalize_detections(
    detections: &[Detection],
    scale: f64,
    config: &TextLineConfig,
) -> Vec<Rect<i32>> {
    let mut boxes: Vec<_> = detections
        .iter()
        .filter_map(|d| quad_to_box(&d.quad, scale, config.min_edge))
        .collect();

    let discarded = detections.len() - boxes.len();
    if discarded > 0 {
        tracing::debug!("discarded {discarded} degenerate text line(s)");
    }

    sort_top_to_bottom(&mut boxes);
    boxes
}
