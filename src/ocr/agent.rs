use image::ImageFormat;
use tesseract::{OcrEngineMode, Tesseract, TesseractError};

use super::{PageSegMode, Recognizer};
use crate::Result;

/// Tesseract-backed [`Recognizer`], running the LSTM engine only.
pub struct TesseractAgent {
    arguments: TesseractInitArguments,
    inner: Option<Tesseract>,
}

pub enum TesseractInitArguments {
    Default,
    DataPath { data_path: String, lang: String },
    Generic { data_path: Option<String>, lang: Option<String> },
}

impl TesseractInitArguments {
    fn init(&self) -> Result<Tesseract> {
        let (data_path, lang) = match self {
            Self::Default => (None, Some("eng")),
            Self::DataPath { data_path, lang } => (Some(data_path.as_str()), Some(lang.as_str())),
            Self::Generic { data_path, lang } => (data_path.as_deref(), lang.as_deref()),
        };

        let tesseract = Tesseract::new_with_oem(data_path, lang, OcrEngineMode::LstmOnly)
            .map_err(TesseractError::from)?;

        Ok(tesseract)
    }
}

impl TesseractAgent {
    pub fn new() -> Result<Self> {
        Self::with_arguments(TesseractInitArguments::Default)
    }

    pub fn new_with_lang(lang: &[&str]) -> Result<Self> {
        Self::with_arguments(TesseractInitArguments::Generic {
            data_path: None,
            lang: Some(lang.join("+")),
        })
    }

    pub fn new_data_path(data_path: &str, lang: &[&str]) -> Result<Self> {
        // data_path is tessdata, which includes the traineddata files
        // https://github.com/tesseract-ocr/tessdata_best
        Self::with_arguments(TesseractInitArguments::DataPath {
            data_path: data_path.to_string(),
            lang: lang.join("+"),
        })
    }

    pub fn with_arguments(arguments: TesseractInitArguments) -> Result<Self> {
        let inner = arguments.init()?;

        Ok(Self {
            inner: Some(inner),
            arguments,
        })
    }

    fn take_inner(&mut self) -> Result<Tesseract> {
        match self.inner.take() {
            Some(inner) => Ok(inner),
            None => self.arguments.init(),
        }
    }

    /// Recognize the text in `img` with the given page segmentation mode.
    ///
    /// The image is handed to tesseract through a temporary PNG which is removed
    /// when this returns, whether or not recognition succeeded.
    pub fn extract_text(&mut self, img: &image::DynamicImage, mode: PageSegMode) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("idcard-ocr-")
            .suffix(".png")
            .tempfile()?;
        img.save_with_format(file.path(), ImageFormat::Png)?;
        let path = file.path().to_string_lossy();

        let inner = self.take_inner()?;

        let mut inner = match inner
            .set_variable("tessedit_pageseg_mode", mode.as_tesseract_value())
            .map_err(TesseractError::from)
            .and_then(|tess| tess.set_image(&path).map_err(TesseractError::from))
        {
            Ok(tess) => tess,
            Err(err) => {
                // the handle was consumed, so rebuild it for the next call
                self.inner = self.arguments.init().ok();
                return Err(err.into());
            }
        };

        let text = inner.get_text().map_err(TesseractError::from);
        self.inner = Some(inner);

        Ok(text?.trim().to_string())
    }
}

impl Recognizer for TesseractAgent {
    fn recognize(&mut self, img: &image::DynamicImage, mode: PageSegMode) -> Result<String> {
        self.extract_text(img, mode)
    }
}
