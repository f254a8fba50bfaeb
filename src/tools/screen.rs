//! Screenshot capture for the SCREEN action.
//!
//! Shells out to whichever screenshot utility is installed
//! (gnome-screenshot, scrot, grim, spectacle, maim — checked in that order),
//! writes a PNG to a temp file, and returns it base64-encoded for the vision
//! model.  The temp file is the caller's to clean up via
//! [`ScreenCapture::cleanup`], capture outcome notwithstanding.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use thiserror::Error;

use crate::tools::find_in_path;

// ---------------------------------------------------------------------------
// ScreenError
// ---------------------------------------------------------------------------

/// Errors from screenshot capture.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("no screenshot tool found (install gnome-screenshot, scrot, or grim)")]
    NoBackend,

    #[error("screenshot command failed: {0}")]
    CommandFailed(String),

    #[error("screenshot file was not created")]
    FileMissing,

    #[error("screenshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Screenshot
// ---------------------------------------------------------------------------

/// One captured image: base64 PNG for the vision model plus the temp-file
/// path for cleanup.
pub struct Screenshot {
    pub base64: String,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// ScreenCapture trait
// ---------------------------------------------------------------------------

/// Screen capture capability consumed by the SCREEN action.
pub trait ScreenCapture: Send + Sync {
    /// Capture the full screen.
    fn capture(&self) -> Result<Screenshot, ScreenError>;

    /// Capture the active window (falls back to full screen on backends
    /// without window support).
    fn capture_window(&self) -> Result<Screenshot, ScreenError>;

    /// Remove a previously captured temp file.
    fn cleanup(&self, path: &Path) -> Result<(), ScreenError>;
}

// ---------------------------------------------------------------------------
// ScreenshotTool
// ---------------------------------------------------------------------------

/// Preference-ordered backends.
const BACKENDS: &[&str] = &["gnome-screenshot", "scrot", "grim", "spectacle", "maim"];

/// [`ScreenCapture`] over an external screenshot utility.
pub struct ScreenshotTool {
    temp_dir: PathBuf,
    backend: &'static str,
}

impl ScreenshotTool {
    /// Detect an installed backend.  Returns `None` when no known screenshot
    /// utility is on `PATH` — the orchestrator then runs without the SCREEN
    /// action.
    pub fn detect() -> Option<Self> {
        let backend = BACKENDS
            .iter()
            .copied()
            .find(|backend| find_in_path(backend).is_some())?;
        Some(Self {
            temp_dir: std::env::temp_dir(),
            backend,
        })
    }

    /// Name of the detected backend, for startup logging.
    pub fn backend(&self) -> &str {
        self.backend
    }

    fn fresh_path(&self) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        self.temp_dir.join(format!("hark-screenshot-{nanos}.png"))
    }

    fn run(&self, args: &[&str], path: &Path) -> Result<Screenshot, ScreenError> {
        let status = Command::new(self.backend)
            .args(args)
            .status()
            .map_err(|e| ScreenError::CommandFailed(e.to_string()))?;

        if !status.success() {
            return Err(ScreenError::CommandFailed(format!(
                "{} exited with {status}",
                self.backend
            )));
        }
        if !path.exists() {
            return Err(ScreenError::FileMissing);
        }

        let data = std::fs::read(path)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        Ok(Screenshot {
            base64: encoded,
            path: path.to_path_buf(),
        })
    }

    fn full_screen_args<'a>(&self, path: &'a str) -> Vec<&'a str> {
        match self.backend {
            "gnome-screenshot" => vec!["-f", path],
            "scrot" => vec![path],
            "grim" => vec![path],
            "spectacle" => vec!["-b", "-n", "-o", path],
            _ => vec![path], // maim
        }
    }

    fn window_args<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        match self.backend {
            "gnome-screenshot" => Some(vec!["-w", "-f", path]),
            "scrot" => Some(vec!["-u", path]),
            "spectacle" => Some(vec!["-a", "-b", "-n", "-o", path]),
            // grim and maim have no notion of the active window by themselves.
            _ => None,
        }
    }
}

impl ScreenCapture for ScreenshotTool {
    fn capture(&self) -> Result<Screenshot, ScreenError> {
        let path = self.fresh_path();
        let path_str = path.display().to_string();
        self.run(&self.full_screen_args(&path_str), &path)
    }

    fn capture_window(&self) -> Result<Screenshot, ScreenError> {
        let path = self.fresh_path();
        let path_str = path.display().to_string();
        match self.window_args(&path_str) {
            Some(args) => self.run(&args, &path),
            None => {
                log::debug!("{} cannot capture a single window, using full screen", self.backend);
                self.run(&self.full_screen_args(&path_str), &path)
            }
        }
    }

    fn cleanup(&self, path: &Path) -> Result<(), ScreenError> {
        std::fs::remove_file(path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
