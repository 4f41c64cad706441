//! Error types shared by the annotator and the searcher

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;
use crate::ocr::RecognitionError;

/// Top-level error for annotation and search operations
#[derive(Error, Debug)]
pub enum TaggerError {
    /// A directory or option the component was configured with is unusable
    #[error("configuration error for {path:?}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    #[error("directory {0:?} does not exist")]
    DirectoryNotFound(PathBuf),

    /// Extension outside the accepted image set; skipped, never surfaced
    #[error("unsupported file type: {0:?}")]
    UnsupportedFile(PathBuf),

    #[error("text recognition failed for {file}: {source}")]
    Recognition {
        file: String,
        #[source]
        source: RecognitionError,
    },

    #[error("image codec failure for {file}: {source}")]
    Codec {
        file: String,
        #[source]
        source: CodecError,
    },

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to list directory {path:?}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TaggerError {
    pub(crate) fn configuration(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaggerError>;
