//! OCR over cropped text line images.

#[cfg(feature = "ocr")]
mod agent;

#[cfg(feature = "ocr")]
pub use agent::{TesseractAgent, TesseractInitArguments};

use crate::Result;

/// How the OCR engine should assume text is laid out in a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSegMode {
    /// A single uniform block of text.
    #[default]
    UniformBlock,
    /// A single word.
    SingleWord,
    /// A single word in a circle, as on the Voter ID gender mark.
    CircleWord,
}

impl PageSegMode {
    /// The `tessedit_pageseg_mode` value for this mode.
    pub fn as_tesseract_value(&self) -> &'static str {
        match self {
            PageSegMode::UniformBlock => "6",
            PageSegMode::SingleWord => "8",
            PageSegMode::CircleWord => "9",
        }
    }
}

/// Reads the text in an image region.
pub trait Recognizer {
    fn recognize(&mut self, img: &image::DynamicImage, mode: PageSegMode) -> Result<String>;
}

impl<R: Recognizer + ?Sized> Recognizer for &mut R {
    fn recognize(&mut self, img: &image::DynamicImage, mode: PageSegMode) -> Result<String> {
        (**self).recognize(img, mode)
    }
}
