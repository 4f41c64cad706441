//! Presenting images to the user
//!
//! Hands a file to an external viewer. Failures are reported to the caller,
//! which logs them; nothing here blocks on the viewer closing.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Something that can show an image file
pub trait ImageViewer {
    fn show(&self, path: &Path) -> io::Result<()>;
}

/// Opens images with a configured command or the platform default opener
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    command: Option<String>,
}

impl SystemViewer {
    /// `command` overrides the platform opener (e.g. "feh" or "eog")
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    fn build_command(&self, path: &Path) -> Command {
        if let Some(program) = &self.command {
            let mut cmd = Command::new(program);
            cmd.arg(path);
            return cmd;
        }

        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        }
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl ImageViewer for SystemViewer {
    fn show(&self, path: &Path) -> io::Result<()> {
        let mut cmd = self.build_command(path);
        debug!("Opening {:?} with {:?}", path, cmd.get_program());
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // Reap the viewer in the background so it never lingers as a zombie
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                debug!("Viewer process wait failed: {}", e);
            }
        });
        Ok(())
    }
}
