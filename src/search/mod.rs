//! Search over annotated images
//!
//! Every search is a full scan: each PNG in the directory is opened, its
//! [`OCR_TEXT_KEY`] attribute read back and matched against the query.
//! Nothing is indexed and OCR is never re-run.

pub mod matcher;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::codec::{ImageCodec, ImageViewer};
use crate::contract::{file_name_of, has_canonical_extension, list_files, OCR_TEXT_KEY};
use crate::error::{Result, TaggerError};
use crate::logging::Logger;

pub use matcher::QueryMatcher;

/// Annotated images matching a query, in directory listing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    paths: Vec<PathBuf>,
}

impl MatchSet {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Scans a directory of annotated images
pub struct Searcher {
    directory: PathBuf,
    codec: Arc<dyn ImageCodec>,
    logger: Logger,
}

impl Searcher {
    /// Fails with [`TaggerError::DirectoryNotFound`] if `directory` is missing
    pub fn new(
        directory: impl Into<PathBuf>,
        codec: Arc<dyn ImageCodec>,
        logger: Logger,
    ) -> Result<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(TaggerError::DirectoryNotFound(directory));
        }
        Ok(Self {
            directory,
            codec,
            logger,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Find images whose embedded text matches `query`, ignoring case
    ///
    /// An invalid pattern fails the call. Files that cannot be read are
    /// logged and skipped; a missing attribute counts as empty text.
    pub fn search(&self, query: &str, use_regex: bool) -> Result<MatchSet> {
        self.logger.scope(|| -> Result<MatchSet> {
            let matcher = QueryMatcher::new(query, use_regex)?;
            let files = list_files(&self.directory, has_canonical_extension).map_err(|source| {
                TaggerError::Enumeration {
                    path: self.directory.clone(),
                    source,
                }
            })?;
            let scanned = files.len();
            debug!("Scanning {} annotated image(s) in {:?}", scanned, self.directory);

            let mut paths = Vec::new();
            for path in files {
                match self.codec.attributes_of(&path) {
                    Ok(attributes) => {
                        let text = attributes
                            .get(OCR_TEXT_KEY)
                            .map(String::as_str)
                            .unwrap_or("");
                        if matcher.is_match(text) {
                            paths.push(path);
                        }
                    }
                    Err(e) => error!("Failed to read {}: {}", file_name_of(&path), e),
                }
            }

            info!(
                "Query {:?} ({}) matched {} of {} images",
                query,
                if use_regex { "pattern" } else { "literal" },
                paths.len(),
                scanned
            );
            Ok(MatchSet { paths })
        })
    }

    /// Print the match count and file names, opening each match in `viewer`
    ///
    /// Viewer failures are logged, never returned.
    pub fn display_results<W: Write>(
        &self,
        matches: &MatchSet,
        out: &mut W,
        viewer: Option<&dyn ImageViewer>,
    ) -> io::Result<()> {
        self.logger.scope(|| -> io::Result<()> {
            if matches.is_empty() {
                writeln!(out, "No matching images found.")?;
                return Ok(());
            }

            writeln!(out, "\nFound {} images:", matches.len())?;
            for path in matches {
                let name = file_name_of(path);
                writeln!(out, "- {}", name)?;
                if let Some(viewer) = viewer {
                    if let Err(e) = viewer.show(path) {
                        error!("Cannot display {}: {}", name, e);
                    }
                }
            }
            Ok(())
        })
    }
}
