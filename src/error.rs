use thiserror::Error;

use crate::record::Field;

#[derive(Error, Debug)]
pub enum Error {
    #[error("ort (onnxruntime) error: {0}")]
    Ort(#[from] ort::Error),
    #[error("hf-hub: {0}")]
    HuggingFace(#[from] hf_hub::api::sync::ApiError),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "ocr")]
    #[error("tesseract: {0}")]
    Tesseract(#[from] tesseract::TesseractError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// Reasons a card could not be read into a record.
///
/// Every variant aborts the whole extraction; no partial record is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No text line matched the anchor. Usually the wrong document layout.
    #[error("{field:?}: no text line matches anchor {anchor:?}")]
    MissingAnchor { field: Field, anchor: String },
    /// The anchor was found, but the line or box it points at does not exist.
    #[error("{field:?}: line {index} is out of range ({len} lines)")]
    IndexOutOfRange {
        field: Field,
        index: usize,
        len: usize,
    },
    /// The anchored line did not split on the delimiter; OCR garbled it.
    #[error("{field:?}: anchored line has nothing after {delimiter:?}")]
    MissingSegment { field: Field, delimiter: String },
    #[error("{field:?}: region between anchors is empty")]
    DegenerateRegion { field: Field },
    /// The detector returned no usable boxes.
    #[error("no text lines detected")]
    NoTextLines,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
