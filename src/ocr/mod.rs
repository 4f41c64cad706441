//! OCR (Optical Character Recognition) module
//!
//! Text extraction is delegated to Tesseract. Two backends:
//! - Tesseract command-line executable (default, needs `tesseract` installed)
//! - In-process leptess bindings (cargo feature `leptess`)

pub mod tesseract;

#[cfg(feature = "leptess")]
pub mod leptess_backend;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::OcrConfig;
use crate::error::TaggerError;

pub use tesseract::TesseractCli;

/// Failure raised by an OCR engine for one image
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("failed to launch OCR engine {command:?}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    EngineExit { status: String, stderr: String },

    #[error("OCR engine produced invalid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("failed to prepare image for OCR: {0}")]
    ImageEncode(#[from] image::ImageError),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// The OCR collaborator: pixels in, text out
///
/// Implementations must be shareable across the annotation worker pool.
pub trait TextRecognizer: Send + Sync {
    /// Extract text from `image` using the `language` hint (Tesseract codes,
    /// e.g. "pol", "eng", "eng+deu")
    fn extract_text(&self, image: &DynamicImage, language: &str)
        -> Result<String, RecognitionError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// OCR backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// `tesseract` executable, image piped over stdin
    #[default]
    TesseractCli,
    /// libtesseract through leptess
    Leptess,
}

/// Build the recognizer selected by `config`
pub fn build_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, TaggerError> {
    let recognizer: Arc<dyn TextRecognizer> = match config.backend {
        OcrBackend::TesseractCli => Arc::new(TesseractCli::new(&config.command)),
        OcrBackend::Leptess => leptess_recognizer(config)?,
    };

    info!(
        "OCR backend: {} (language: {})",
        recognizer.name(),
        config.language
    );
    Ok(recognizer)
}

#[cfg(feature = "leptess")]
fn leptess_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, TaggerError> {
    Ok(Arc::new(leptess_backend::LeptessRecognizer::new(
        config.data_path.clone(),
    )))
}

#[cfg(not(feature = "leptess"))]
fn leptess_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>, TaggerError> {
    Err(TaggerError::configuration(
        config.data_path.clone().unwrap_or_default(),
        "the leptess OCR backend requires building with the `leptess` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_is_cli() {
        let config = OcrConfig::default();
        let recognizer = build_recognizer(&config).unwrap();
        assert_eq!(recognizer.name(), "tesseract-cli");
    }

    #[cfg(not(feature = "leptess"))]
    #[test]
    fn test_leptess_without_feature_is_configuration_error() {
        let config = OcrConfig {
            backend: OcrBackend::Leptess,
            ..OcrConfig::default()
        };
        let result = build_recognizer(&config);
        assert!(matches!(result, Err(TaggerError::Configuration { .. })));
    }

    #[test]
    fn test_backend_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            backend: OcrBackend,
        }
        let parsed: Wrapper = toml::from_str("backend = \"leptess\"").unwrap();
        assert_eq!(parsed.backend, OcrBackend::Leptess);
        let parsed: Wrapper = toml::from_str("backend = \"tesseract_cli\"").unwrap();
        assert_eq!(parsed.backend, OcrBackend::TesseractCli);
    }
}
