//! In-process Tesseract via leptess

use image::{DynamicImage, ImageFormat};
use leptess::LepTess;
use std::io::Cursor;

use super::{RecognitionError, TextRecognizer};

/// libtesseract recognizer
///
/// `LepTess` is neither `Send` nor `Sync`, so each call builds its own
/// engine; worker threads never share one.
#[derive(Debug, Clone, Default)]
pub struct LeptessRecognizer {
    data_path: Option<String>,
}

impl LeptessRecognizer {
    /// `data_path` points at a tessdata directory; `None` uses the system default
    pub fn new(data_path: Option<String>) -> Self {
        Self { data_path }
    }
}

impl TextRecognizer for LeptessRecognizer {
    fn extract_text(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<String, RecognitionError> {
        let mut png_bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;

        let mut lt = LepTess::new(self.data_path.as_deref(), language)
            .map_err(|e| RecognitionError::Engine(format!("Failed to initialize tesseract: {e}")))?;
        lt.set_image_from_mem(&png_bytes)
            .map_err(|e| RecognitionError::Engine(format!("Failed to set image: {e}")))?;
        lt.get_utf8_text()
            .map_err(|e| RecognitionError::Engine(format!("Failed to extract text: {e}")))
    }

    fn name(&self) -> &'static str {
        "leptess"
    }
}
