use geo_types::{coord, Rect};

/// One detected text line: its box in original-image pixels and the text OCR read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub bbox: Rect<i32>,
    pub text: String,
}

impl TextLine {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, text: impl Into<String>) -> Self {
        let bbox = Rect::new(coord! { x: x1, y: y1 }, coord! { x: x2, y: y2 });

        Self {
            bbox,
            text: text.into(),
        }
    }

    pub fn with_bbox(bbox: Rect<i32>, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }

    pub fn crop_from_image(&self, img: &image::DynamicImage) -> Option<image::DynamicImage> {
        crop_region(img, self.bbox)
    }
}

/// Crops `region` out of `img`, clamped to the image bounds.
///
/// Returns `None` when nothing of the region lies inside the image.
pub fn crop_region(img: &image::DynamicImage, region: Rect<i32>) -> Option<image::DynamicImage> {
    let (width, height) = (img.width() as i64, img.height() as i64);

    let x1 = (region.min().x as i64).clamp(0, width);
    let y1 = (region.min().y as i64).clamp(0, height);
    let x2 = (region.max().x as i64).clamp(0, width);
    let y2 = (region.max().y as i64).clamp(0, height);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(img.crop_imm(
        x1 as u32,
        y1 as u32,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
    ))
}
