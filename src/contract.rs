//! Data contract shared by annotation and search
//!
//! The annotator and the searcher never talk to each other directly. They
//! agree only on what lives in this module: which files are sources, what
//! an annotated file is called, and the attribute key carrying its text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Attribute key holding the recognized text
pub const OCR_TEXT_KEY: &str = "OCR_Text";

/// Extension of the canonical output format (PNG)
pub const CANONICAL_EXTENSION: &str = "png";

/// Source extensions accepted for annotation, compared case-insensitively
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Key-value text attributes embedded in an image
pub type TextAttributes = BTreeMap<String, String>;

/// How annotated file names are derived from source names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// `<stem>.png`; sources sharing a stem overwrite each other
    #[default]
    Stem,
    /// `<stem>_<ext>.png`; keeps `photo.jpg` and `photo.png` apart
    StemWithExtension,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `path` has one of the accepted source extensions
pub fn has_accepted_extension(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` is in the canonical output format
pub fn has_canonical_extension(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| ext == CANONICAL_EXTENSION)
}

/// Trim recognized text before it is stored
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Output path for `source` inside `output_dir`
pub fn output_path_for(output_dir: &Path, source: &Path, naming: OutputNaming) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match (naming, extension_of(source)) {
        (OutputNaming::StemWithExtension, Some(ext)) => {
            format!("{stem}_{ext}.{CANONICAL_EXTENSION}")
        }
        _ => format!("{stem}.{CANONICAL_EXTENSION}"),
    };

    output_dir.join(name)
}

/// Display name used in log lines and reports
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Regular files directly inside `dir` accepted by `filter`, sorted by path
///
/// Flat listing; subdirectories are never descended into. Symlinks to
/// regular files are included, dangling ones are not.
pub fn list_files(dir: &Path, filter: impl Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && filter(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
