//! Batch annotation
//!
//! Runs OCR over every source image in a directory and writes a PNG copy of
//! each one carrying the recognized text under [`OCR_TEXT_KEY`]. Files are
//! independent: one failing never stops the others.

pub mod pool;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::codec::ImageCodec;
use crate::config::{AnnotateSettings, OcrConfig};
use crate::contract::{
    file_name_of, has_accepted_extension, list_files, normalize_text, output_path_for,
    OutputNaming, TextAttributes, OCR_TEXT_KEY,
};
use crate::error::{Result, TaggerError};
use crate::logging::Logger;
use crate::ocr::TextRecognizer;

/// Worker count used when none is configured
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Where and how to annotate
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Worker threads for `process_all`; must be at least 1
    pub concurrency: usize,
    /// Language hint passed to the OCR engine
    pub language: String,
    pub naming: OutputNaming,
}

impl AnnotatorConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            language: OcrConfig::default().language,
            naming: OutputNaming::default(),
        }
    }

    pub fn from_settings(settings: &AnnotateSettings, ocr: &OcrConfig) -> Self {
        Self {
            input_dir: settings.input_dir.clone(),
            output_dir: settings.output_dir.clone(),
            concurrency: settings.concurrency,
            language: ocr.language.clone(),
            naming: settings.output_naming,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }
}

/// Outcome of one `process_all` batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files that produced an annotated image
    pub processed_count: usize,
    /// Accepted-extension files considered
    pub total_count: usize,
    /// Distinct annotated images written, sorted
    pub outputs: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.total_count - self.processed_count
    }
}

/// OCR annotator over a directory of images
pub struct Annotator {
    config: AnnotatorConfig,
    recognizer: Arc<dyn TextRecognizer>,
    codec: Arc<dyn ImageCodec>,
    logger: Logger,
}

impl Annotator {
    /// Validate `config` and make sure the output directory exists
    ///
    /// Creating the output directory is idempotent. Fails with
    /// [`TaggerError::Configuration`] if the input directory is missing, the
    /// output directory cannot be created, or concurrency is zero.
    pub fn configure(
        config: AnnotatorConfig,
        recognizer: Arc<dyn TextRecognizer>,
        codec: Arc<dyn ImageCodec>,
        logger: Logger,
    ) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(TaggerError::configuration(
                &config.input_dir,
                "concurrency must be at least 1",
            ));
        }
        if !config.input_dir.is_dir() {
            return Err(TaggerError::configuration(
                &config.input_dir,
                "input directory does not exist or is not a directory",
            ));
        }

        std::fs::create_dir_all(&config.output_dir).map_err(|e| {
            TaggerError::configuration(
                &config.output_dir,
                format!("cannot create output directory: {e}"),
            )
        })?;
        if !config.output_dir.is_dir() {
            return Err(TaggerError::configuration(
                &config.output_dir,
                "output path exists and is not a directory",
            ));
        }

        logger.scope(|| {
            debug!(
                "Annotator ready: {:?} -> {:?} ({} workers, ocr={}, lang={})",
                config.input_dir,
                config.output_dir,
                config.concurrency,
                recognizer.name(),
                config.language
            )
        });

        Ok(Self {
            config,
            recognizer,
            codec,
            logger,
        })
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate a single file
    ///
    /// Returns the annotated image path, or `None` when the file was skipped
    /// (unsupported extension) or failed (logged with its cause).
    pub fn process_one(&self, path: &Path) -> Option<PathBuf> {
        self.logger.scope(|| self.process_logged(path))
    }

    /// Annotate every accepted image in the input directory
    ///
    /// Only a failure to list the input directory is returned as an error;
    /// per-file failures are logged and counted.
    pub fn process_all(&self) -> Result<BatchSummary> {
        self.logger.scope(|| -> Result<BatchSummary> {
            let files = list_files(&self.config.input_dir, has_accepted_extension).map_err(
                |source| TaggerError::Enumeration {
                    path: self.config.input_dir.clone(),
                    source,
                },
            )?;
            let total_count = files.len();
            info!(
                "Found {} image(s) in {:?}",
                total_count, self.config.input_dir
            );
            self.warn_on_collisions(&files);

            let results = pool::run_bounded(files, self.config.concurrency, &self.logger, |path| {
                self.process_logged(path)
            });

            let mut outputs = Vec::with_capacity(results.len());
            for (path, outcome) in results {
                match outcome {
                    Ok(Some(output)) => outputs.push(output),
                    Ok(None) => {}
                    Err(panic) => error!(
                        "Failed to process {}: worker panicked: {}",
                        file_name_of(&path),
                        panic
                    ),
                }
            }
            let processed_count = outputs.len();
            // Colliding sources share one output path
            outputs.sort();
            outputs.dedup();

            let summary = BatchSummary {
                processed_count,
                total_count,
                outputs,
            };
            info!(
                "Processed {} of {} files",
                summary.processed_count, summary.total_count
            );
            Ok(summary)
        })
    }

    fn process_logged(&self, path: &Path) -> Option<PathBuf> {
        let name = file_name_of(path);
        match self.annotate_file(path) {
            Ok(output) => {
                info!("Processed: {}", name);
                Some(output)
            }
            Err(TaggerError::UnsupportedFile(_)) => {
                debug!("Skipped unsupported file: {}", name);
                None
            }
            Err(e) => {
                error!("Failed to process {}: {}", name, e);
                None
            }
        }
    }

    fn annotate_file(&self, path: &Path) -> Result<PathBuf> {
        if !has_accepted_extension(path) {
            return Err(TaggerError::UnsupportedFile(path.to_path_buf()));
        }
        let file = file_name_of(path);

        let image = self.codec.decode(path).map_err(|source| TaggerError::Codec {
            file: file.clone(),
            source,
        })?;

        let raw = self
            .recognizer
            .extract_text(&image, &self.config.language)
            .map_err(|source| TaggerError::Recognition {
                file: file.clone(),
                source,
            })?;
        let text = normalize_text(&raw);
        debug!("Recognized {} chars in {}", text.chars().count(), file);

        let mut attributes = TextAttributes::new();
        attributes.insert(OCR_TEXT_KEY.to_string(), text);

        let output = output_path_for(&self.config.output_dir, path, self.config.naming);
        // Only complete files are renamed into place
        let partial = self.config.output_dir.join(format!(".{file}.partial"));
        let written = self
            .codec
            .encode(&image, &attributes, &partial)
            .and_then(|()| std::fs::rename(&partial, &output).map_err(Into::into));
        if let Err(source) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(TaggerError::Codec { file, source });
        }

        Ok(output)
    }

    fn warn_on_collisions(&self, files: &[PathBuf]) {
        let mut by_output: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for file in files {
            by_output
                .entry(output_path_for(&self.config.output_dir, file, self.config.naming))
                .or_default()
                .push(file_name_of(file));
        }

        for (output, sources) in by_output.iter().filter(|(_, sources)| sources.len() > 1) {
            warn!(
                "{} sources map to {} ({}); the last one to finish overwrites the others",
                sources.len(),
                file_name_of(output),
                sources.join(", ")
            );
        }
    }
}
