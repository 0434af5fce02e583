use std::path::{Path, PathBuf};

use geo_types::Rect;

use crate::extract::FieldExtractor;
use crate::geometry::{self, TextLineConfig};
use crate::models::TextDetector;
use crate::ocr::{PageSegMode, Recognizer};
use crate::record::{self, Extraction};
use crate::text_line::TextLine;
use crate::Result;

/// Detect, read and extract one card image at a time.
///
/// The detector and recognizer are owned by the pipeline and released with it.
pub struct Pipeline<D, R> {
    detector: D,
    recognizer: R,
    config: TextLineConfig,
}

impl<D: TextDetector, R: Recognizer> Pipeline<D, R> {
    pub fn new(detector: D, recognizer: R) -> Self {
        Self {
            detector,
            recognizer,
            config: TextLineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TextLineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TextLineConfig {
        &self.config
    }

    /// Text line boxes in original-image pixels, top to bottom.
    pub fn detect_boxes(&self, img: &image::DynamicImage) -> Result<Vec<Rect<i32>>> {
        let (resized, scale) = geometry::resize(img, self.config.scale, self.config.max_scale);
        tracing::debug!(
            "resized {}x{} to {}x{} (scale {scale})",
            img.width(),
            img.height(),
            resized.width(),
            resized.height()
        );

        let detections = self.detector.detect(&resized)?;

        Ok(geometry::normalize_detections(&detections, scale, &self.config))
    }

    /// Detects text lines and OCRs each one as a uniform block of text.
    pub fn read_lines(&mut self, img: &image::DynamicImage) -> Result<Vec<TextLine>> {
        let boxes = self.detect_boxes(img)?;
        tracing::debug!("reading {} text line(s)", boxes.len());

        let mut lines = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let mut line = TextLine::with_bbox(bbox, String::new());
            // a box entirely off the image keeps its slot with empty text
            if let Some(crop) = line.crop_from_image(img) {
                line.text = self.recognizer.recognize(&crop, PageSegMode::UniformBlock)?;
            }
            lines.push(line);
        }

        Ok(lines)
    }

    pub fn process(&mut self, img: &image::DynamicImage) -> Result<Extraction> {
        let lines = self.read_lines(img)?;
        FieldExtractor::new(&lines, img, &mut self.recognizer).extract()
    }

    /// Processes the image at `path` and writes the record next to it as `.json`.
    ///
    /// Nothing is written when extraction fails.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> Result<(PathBuf, Extraction)> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let extraction = self.process(&img)?;

        let output = record::output_path(path);
        extraction.write_json(&output)?;

        Ok((output, extraction))
    }

    pub fn into_parts(self) -> (D, R) {
        (self.detector, self.recognizer)
    }
}
