//! Application Configuration
//!
//! Annotation, OCR, search and display settings stored in TOML format.
//! Every field has a default, so a config file only needs the values it
//! changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::contract::OutputNaming;
use crate::ocr::OcrBackend;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch annotation settings
    pub annotate: AnnotateSettings,
    /// OCR engine settings
    pub ocr: OcrConfig,
    /// Search settings
    pub search: SearchSettings,
    /// Result display settings
    pub display: DisplaySettings,
}

/// Batch annotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateSettings {
    /// Directory holding the source images
    pub input_dir: PathBuf,
    /// Directory receiving the annotated copies (created if missing)
    pub output_dir: PathBuf,
    /// Number of worker threads
    pub concurrency: usize,
    /// How output file names are derived from source names
    pub output_naming: OutputNaming,
}

impl Default for AnnotateSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./"),
            output_dir: PathBuf::from("./processed_images"),
            concurrency: 4,
            output_naming: OutputNaming::Stem,
        }
    }
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Backend to use
    pub backend: OcrBackend,
    /// Tesseract executable (name on PATH or full path)
    pub command: PathBuf,
    /// Tesseract language code(s), e.g. "pol" or "eng+pol"
    pub language: String,
    /// tessdata directory for the leptess backend
    pub data_path: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::TesseractCli,
            command: PathBuf::from("tesseract"),
            language: "pol".to_string(),
            data_path: None,
        }
    }
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Directory of annotated images to scan
    pub directory: PathBuf,
    /// Treat queries as regular expressions
    pub use_regex: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./processed_images"),
            use_regex: false,
        }
    }
}

/// Result display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Open each matching image in a viewer
    pub open_matches: bool,
    /// Viewer command; the platform opener when unset
    pub viewer: Option<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            open_matches: true,
            viewer: None,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "ocrtagger", "OcrTagger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Resolve the configuration for a run
///
/// An explicit path must load. Without one, the default location is used
/// when the file exists and built-in defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?;
        return Ok((config, Some(path.to_path_buf())));
    }

    if let Ok(path) = default_config_path() {
        if path.exists() {
            let config = load_config(&path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            return Ok((config, Some(path)));
        }
    }

    Ok((AppConfig::default(), None))
}
