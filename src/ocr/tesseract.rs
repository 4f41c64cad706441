//! Tesseract command-line backend
//!
//! Runs `tesseract stdin stdout -l <language>` and feeds the image as PNG
//! over stdin, so no temporary files are needed.

use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use super::{RecognitionError, TextRecognizer};

/// OCR through an external `tesseract` executable
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
}

impl TesseractCli {
    /// `command` is the executable name or full path
    pub fn new(command: impl AsRef<Path>) -> Self {
        Self {
            command: command.as_ref().to_path_buf(),
        }
    }

    fn launch_error(&self, source: std::io::Error) -> RecognitionError {
        RecognitionError::Launch {
            command: self.command.display().to_string(),
            source,
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TextRecognizer for TesseractCli {
    fn extract_text(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<String, RecognitionError> {
        let mut png_bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;

        debug!(
            "Running {:?} on {}x{} image ({} bytes, lang={})",
            self.command,
            image.width(),
            image.height(),
            png_bytes.len(),
            language
        );

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.launch_error(e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecognitionError::Engine("stdin of OCR engine unavailable".to_string()))?;

        // Feed stdin from its own thread so a chatty engine cannot deadlock on a full pipe
        let feeder = std::thread::spawn(move || stdin.write_all(&png_bytes));
        let output = child.wait_with_output().map_err(|e| self.launch_error(e))?;
        let fed = feeder
            .join()
            .map_err(|_| RecognitionError::Engine("stdin writer thread panicked".to_string()))?;

        if !output.status.success() {
            return Err(RecognitionError::EngineExit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // The engine succeeded, so a short stdin write is not an error
        if let Err(e) = fed {
            debug!("OCR engine closed stdin early: {}", e);
        }

        Ok(String::from_utf8(output.stdout)?)
    }

    fn name(&self) -> &'static str {
        "tesseract-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_missing_executable_is_launch_error() {
        let ocr = TesseractCli::new("/nonexistent/bin/tesseract");
        let result = ocr.extract_text(&sample_image(), "eng");
        assert!(matches!(result, Err(RecognitionError::Launch { .. })));
    }

    #[test]
    fn test_default_command() {
        assert_eq!(TesseractCli::default().command, PathBuf::from("tesseract"));
    }

    #[cfg(unix)]
    fn fake_engine(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-tesseract");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_engine_receives_language_and_image() {
        let dir = tempfile::tempdir().unwrap();
        // Prints the language argument and the PNG signature bytes it was fed
        let engine = fake_engine(
            dir.path(),
            "#!/bin/sh\nmagic=$(head -c 4 | tail -c 3)\ncat > /dev/null\necho \"  lang=$4 magic=$magic  \"\n",
        );

        let text = TesseractCli::new(&engine)
            .extract_text(&sample_image(), "pol")
            .unwrap();

        assert_eq!(text.trim(), "lang=pol magic=PNG");
    }

    #[cfg(unix)]
    #[test]
    fn test_fake_engine_failure_status() {
        let dir = tempfile::tempdir().unwrap();
        let engine = fake_engine(
            dir.path(),
            "#!/bin/sh\ncat > /dev/null\necho 'Failed loading language' >&2\nexit 1\n",
        );

        let result = TesseractCli::new(&engine).extract_text(&sample_image(), "xyz");
        match result {
            Err(RecognitionError::EngineExit { stderr, .. }) => {
                assert!(stderr.contains("Failed loading language"));
            }
            other => panic!("expected EngineExit, got {:?}", other),
        }
    }
}
