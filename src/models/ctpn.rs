use std::path::Path;

use ndarray::{Array, Array4, ArrayViewD, Axis};
use ort::{Session, SessionBuilder};

pub use crate::error::{Error, Result};
use crate::utils::vec_to_quad;

use super::{Detection, TextDetector};

/// A [`CTPN`](https://arxiv.org/abs/1609.03605) text line detector exported to ONNX.
///
/// The exported graph is expected to include proposal decoding and text line
/// construction, producing one `[N, 9]` output: four `(x, y)` corners followed by
/// a score, in the pixel space of the image it was given.
pub struct CtpnModel {
    model_name: String,
    model: ort::Session,
    line_min_score: f32,
}

impl CtpnModel {
    /// Per-channel means in BGR order, subtracted before inference.
    pub const PIXEL_MEANS: [f32; 3] = [102.9801, 115.9465, 122.7717];
    pub const DEFAULT_LINE_MIN_SCORE: f32 = 0.9;

    /// Construct a [`CtpnModel`] from an ONNX file hosted on Hugging Face.
    pub fn pretrained(hf_repo: &str, hf_filename: &str) -> Result<Self> {
        Self::configure_pretrained(
            hf_repo,
            hf_filename,
            Self::DEFAULT_LINE_MIN_SCORE,
            Session::builder()?,
        )
    }

    pub fn configure_pretrained(
        hf_repo: &str,
        hf_filename: &str,
        line_min_score: f32,
        session_builder: SessionBuilder,
    ) -> Result<Self> {
        let api = hf_hub::api::sync::Api::new()?;
        let filename = api.model(hf_repo.to_string()).get(hf_filename)?;

        let model = session_builder.commit_from_file(filename)?;

        Ok(Self {
            model_name: hf_repo.to_string(),
            model,
            line_min_score,
        })
    }

    pub fn new_from_file(
        file_path: impl AsRef<Path>,
        model_name: &str,
        line_min_score: f32,
        session_builder: SessionBuilder,
    ) -> Result<Self> {
        let model = session_builder.commit_from_file(file_path)?;

        Ok(Self {
            model_name: model_name.to_string(),
            model,
            line_min_score,
        })
    }

    pub fn name(&self) -> &str {
        &self.model_name
    }

    /// Detect text lines in an image that has already been resized to detector scale.
    pub fn predict(&self, img: &image::DynamicImage) -> Result<Vec<Detection>> {
        let input = image_to_input(img);

        let input_name = &self.model.inputs[0].name;

        let outputs = self
            .model
            .run(ort::inputs![input_name => input]?)
            .map_err(|err| {
                tracing::error!(
                    "{} failed on {}x{} input: {err}",
                    self.model_name,
                    img.width(),
                    img.height()
                );
                err
            })?;

        let tensor = outputs[0].try_extract_tensor::<f32>()?;
        let detections = rows_to_detections(tensor.view(), self.line_min_score)?;

        tracing::debug!(
            "{} detected {} text line(s) in {}x{} input",
            self.model_name,
            detections.len(),
            img.width(),
            img.height()
        );

        Ok(detections)
    }
}

impl TextDetector for CtpnModel {
    fn detect(&self, img: &image::DynamicImage) -> Result<Vec<Detection>> {
        self.predict(img)
    }
}

/// NHWC `[1, H, W, 3]` tensor in BGR order with [`CtpnModel::PIXEL_MEANS`] subtracted.
fn image_to_input(img: &image::DynamicImage) -> Array4<f32> {
    let img_rgb8 = img.to_rgb8();
    let (width, height) = img_rgb8.dimensions();

    let mut input = Array::zeros((1, height as usize, width as usize, 3));

    for pixel in img_rgb8.enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2 .0;
        input[[0, y, x, 0]] = b as f32 - CtpnModel::PIXEL_MEANS[0];
        input[[0, y, x, 1]] = g as f32 - CtpnModel::PIXEL_MEANS[1];
        input[[0, y, x, 2]] = r as f32 - CtpnModel::PIXEL_MEANS[2];
    }

    input
}

/// Turns `[N, 9]` (or `[1, N, 9]`) detector rows into detections scoring at least `min_score`.
fn rows_to_detections(output: ArrayViewD<'_, f32>, min_score: f32) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    let unexpected = || Error::UnexpectedOutput(format!("expected [N, 9] text lines, got {shape:?}"));

    let lines = match output.ndim() {
        2 => output,
        3 if shape[0] == 1 => output.index_axis_move(Axis(0), 0),
        _ => return Err(unexpected()),
    };

    if lines.shape()[1] < 9 {
        return Err(unexpected());
    }

    let detections = lines
        .rows()
        .into_iter()
        .map(|row| vec_to_quad(&row.iter().copied().collect::<Vec<_>>()))
        .filter(|(_, score)| *score >= min_score)
        .map(|(quad, score)| Detection { quad, score })
        .collect();

    Ok(detections)
}
