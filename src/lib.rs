//! OCR tagging for image folders
//!
//! [`annotate::Annotator`] runs text recognition over a directory of images
//! and writes PNG copies carrying the text under the `OCR_Text` key.
//! [`search::Searcher`] scans such copies for a literal or regex query.

pub mod annotate;
pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod logging;
pub mod ocr;
pub mod search;

pub use error::{Result, TaggerError};
