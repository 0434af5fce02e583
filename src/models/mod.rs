//! Text line detectors.

mod ctpn;

pub use ctpn::CtpnModel;

use crate::error::Result;
use crate::geometry::Quad;

/// A scored text line quad in the pixel space of the detector's input image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub quad: Quad,
    pub score: f32,
}

/// Finds text lines in an image.
///
/// Implementations receive the image already resized to detector scale and
/// report quads in that same space.
pub trait TextDetector {
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<Detection>>;
}
