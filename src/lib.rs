//! # Overview
//!
//! Reads identity fields off photographs of Indian Driving Licences and Voter ID cards.
//! Text lines are found with a [CTPN](https://arxiv.org/abs/1609.03605) detector running
//! in onnxruntime (bindings via [ort](https://github.com/pykeio/ort)), each line is read
//! with Tesseract, and the fields are picked out by keyword-anchored rules for the two
//! card layouts.
//!
//! ```no_run
//! use idcard_ort::{models::CtpnModel, ocr::TesseractAgent, Pipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let detector = CtpnModel::new_from_file(
//!         "data/ctpn.onnx",
//!         "ctpn",
//!         CtpnModel::DEFAULT_LINE_MIN_SCORE,
//!         ort::Session::builder()?,
//!     )?;
//!     let ocr = TesseractAgent::new_data_path("tessdata", &["eng"])?;
//!
//!     let mut pipeline = Pipeline::new(detector, ocr);
//!     let (path, extraction) = pipeline.process_file("card.png")?;
//!     println!("{} -> {}", extraction.doc_type.tag(), path.display());
//!     Ok(())
//! }
//! ```

mod error;
pub mod extract;
pub mod geometry;
pub mod models;
pub mod ocr;
mod pipeline;
pub mod record;
mod text_line;
mod utils;

pub use error::{Error, ExtractionError, Result};

// re-exports
pub use geo_types;
pub use image;
pub use ort;

pub use pipeline::Pipeline;
pub use record::{DocumentType, Extraction, Field, FieldRecord};
pub use text_line::{crop_region, TextLine};
