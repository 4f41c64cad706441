//! ocr-tagger - embed OCR text into image metadata and search it
//!
//! `annotate` runs OCR over a folder of images and writes PNG copies that
//! carry the recognized text. `search` scans those copies and lists the
//! ones whose embedded text matches a query.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use ocr_tagger::annotate::{Annotator, AnnotatorConfig};
use ocr_tagger::codec::{ImageViewer, PngCodec, SystemViewer};
use ocr_tagger::config::{self, AppConfig};
use ocr_tagger::contract::OutputNaming;
use ocr_tagger::logging::{self, Logger};
use ocr_tagger::ocr;
use ocr_tagger::search::Searcher;

/// ocr-tagger - OCR annotation and search for image folders
#[derive(Parser, Debug)]
#[command(name = "ocr-tagger")]
#[command(about = "Embed OCR text in image metadata and search it later")]
struct Args {
    /// Configuration file (defaults to the per-user config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run OCR over a directory and write annotated PNG copies
    Annotate(AnnotateArgs),
    /// List annotated images whose text matches a query
    Search(SearchArgs),
    /// Write a configuration file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args, Debug)]
struct AnnotateArgs {
    /// Directory with source images
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for annotated copies (created if missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel OCR workers
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Tesseract language code(s), e.g. "pol" or "eng+pol"
    #[arg(short, long)]
    language: Option<String>,

    /// Path to the tesseract executable
    #[arg(long)]
    tesseract: Option<PathBuf>,

    /// Include the source extension in output names (photo.jpg -> photo_jpg.png)
    #[arg(long)]
    keep_extension: bool,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Text to look for; prompted for when omitted
    query: Option<String>,

    /// Directory of annotated images
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Treat the query as a regular expression
    #[arg(short, long)]
    regex: bool,

    /// Only list matches, do not open them
    #[arg(long)]
    no_open: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_global(args.verbose)?;

    match args.command {
        Command::InitConfig { force } => init_config(args.config, force),
        Command::Annotate(annotate_args) => {
            let mut config = load_config(args.config.as_deref())?;
            apply_annotate_args(&mut config, annotate_args);
            run_annotate(&config)
        }
        Command::Search(search_args) => {
            let mut config = load_config(args.config.as_deref())?;
            let query = apply_search_args(&mut config, search_args);
            run_search(&config, query)
        }
    }
}

/// Load configuration from file or fall back to defaults
fn load_config(explicit: Option<&std::path::Path>) -> Result<AppConfig> {
    let (config, source) = config::resolve_config(explicit)?;
    match source {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("Using default configuration"),
    }
    Ok(config)
}

fn apply_annotate_args(config: &mut AppConfig, args: AnnotateArgs) {
    if let Some(input) = args.input {
        config.annotate.input_dir = input;
    }
    if let Some(output) = args.output {
        config.annotate.output_dir = output;
    }
    if let Some(concurrency) = args.concurrency {
        config.annotate.concurrency = concurrency;
    }
    if let Some(language) = args.language {
        config.ocr.language = language;
    }
    if let Some(tesseract) = args.tesseract {
        config.ocr.command = tesseract;
    }
    if args.keep_extension {
        config.annotate.output_naming = OutputNaming::StemWithExtension;
    }
}

/// Returns the query given on the command line, if any
fn apply_search_args(config: &mut AppConfig, args: SearchArgs) -> Option<String> {
    if let Some(dir) = args.dir {
        config.search.directory = dir;
    }
    if args.regex {
        config.search.use_regex = true;
    }
    if args.no_open {
        config.display.open_matches = false;
    }
    args.query
}

fn run_annotate(config: &AppConfig) -> Result<()> {
    let recognizer = ocr::build_recognizer(&config.ocr)?;
    let annotator = Annotator::configure(
        AnnotatorConfig::from_settings(&config.annotate, &config.ocr),
        recognizer,
        Arc::new(PngCodec::new()),
        Logger::current(),
    )?;

    let summary = annotator.process_all()?;

    println!(
        "Processed {} of {} files into {}",
        summary.processed_count,
        summary.total_count,
        annotator.config().output_dir.display()
    );
    if summary.failed_count() > 0 {
        println!("{} file(s) failed, see the log for details", summary.failed_count());
    }
    Ok(())
}

fn run_search(config: &AppConfig, query: Option<String>) -> Result<()> {
    let searcher = Searcher::new(
        &config.search.directory,
        Arc::new(PngCodec::new()),
        Logger::current(),
    )?;

    let query = match query {
        Some(query) => query,
        None => prompt_query()?,
    };

    info!("Searching {:?}", searcher.directory());
    let matches = searcher.search(&query, config.search.use_regex)?;

    let viewer = SystemViewer::new(config.display.viewer.clone());
    let viewer: Option<&dyn ImageViewer> = if config.display.open_matches {
        Some(&viewer)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    searcher
        .display_results(&matches, &mut out, viewer)
        .context("Failed to print search results")?;
    Ok(())
}

fn prompt_query() -> Result<String> {
    print!("Enter text to search for: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read query from stdin")?;
    if read == 0 {
        bail!("No query given");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Write the default configuration to `path` or the default location
fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    if path.exists() && !force {
        bail!("{:?} already exists (use --force to overwrite)", path);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }

    config::save_config(&AppConfig::default(), &path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_flags_override_config() {
        let args = Args::try_parse_from([
            "ocr-tagger",
            "annotate",
            "--input",
            "scans",
            "-o",
            "tagged",
            "-j",
            "8",
            "--language",
            "eng",
            "--tesseract",
            "/opt/tess/bin/tesseract",
            "--keep-extension",
        ])
        .unwrap();

        let Command::Annotate(annotate_args) = args.command else {
            panic!("expected annotate command");
        };
        let mut config = AppConfig::default();
        apply_annotate_args(&mut config, annotate_args);

        assert_eq!(config.annotate.input_dir, PathBuf::from("scans"));
        assert_eq!(config.annotate.output_dir, PathBuf::from("tagged"));
        assert_eq!(config.annotate.concurrency, 8);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.command, PathBuf::from("/opt/tess/bin/tesseract"));
        assert_eq!(config.annotate.output_naming, OutputNaming::StemWithExtension);
    }

    #[test]
    fn test_annotate_without_flags_keeps_config() {
        let args = Args::try_parse_from(["ocr-tagger", "annotate"]).unwrap();
        let Command::Annotate(annotate_args) = args.command else {
            panic!("expected annotate command");
        };
        let mut config = AppConfig::default();
        apply_annotate_args(&mut config, annotate_args);

        assert_eq!(config.annotate.concurrency, 4);
        assert_eq!(config.annotate.output_naming, OutputNaming::Stem);
    }

    #[test]
    fn test_search_flags() {
        let args = Args::try_parse_from([
            "ocr-tagger",
            "--verbose",
            "search",
            "faktura",
            "--dir",
            "tagged",
            "--regex",
            "--no-open",
        ])
        .unwrap();
        assert!(args.verbose);

        let Command::Search(search_args) = args.command else {
            panic!("expected search command");
        };
        let mut config = AppConfig::default();
        let query = apply_search_args(&mut config, search_args);

        assert_eq!(query.as_deref(), Some("faktura"));
        assert_eq!(config.search.directory, PathBuf::from("tagged"));
        assert!(config.search.use_regex);
        assert!(!config.display.open_matches);
    }

    #[test]
    fn test_search_query_is_optional() {
        let args = Args::try_parse_from(["ocr-tagger", "search"]).unwrap();
        let Command::Search(search_args) = args.command else {
            panic!("expected search command");
        };
        let mut config = AppConfig::default();
        assert!(apply_search_args(&mut config, search_args).is_none());
    }

    #[test]
    fn test_init_config_writes_defaults_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(Some(path.clone()), false).unwrap();
        let loaded = config::load_config(&path).unwrap();
        assert_eq!(loaded.annotate.concurrency, 4);

        assert!(init_config(Some(path.clone()), false).is_err());
        assert!(init_config(Some(path), true).is_ok());
    }
}
