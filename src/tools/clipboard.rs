//! System clipboard access backed by the `arboard` crate.
//!
//! Handles are short-lived — one [`arboard::Clipboard`] per call — because
//! the handle is not `Send` on all platforms and is cheap to create.

use arboard::Clipboard;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ClipboardError
// ---------------------------------------------------------------------------

/// Errors from the system clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Access(String),

    #[error("failed to read clipboard: {0}")]
    Get(String),

    #[error("failed to write clipboard: {0}")]
    Set(String),
}

// ---------------------------------------------------------------------------
// ClipboardService trait
// ---------------------------------------------------------------------------

/// Clipboard capability consumed by the CLIPBOARD action.
pub trait ClipboardService: Send + Sync {
    /// Current plain-text clipboard content, trimmed.  An empty or non-text
    /// clipboard reads as the empty string, not an error.
    fn read(&self) -> Result<String, ClipboardError>;

    /// Replace the clipboard content.
    fn write(&self, content: &str) -> Result<(), ClipboardError>;
}

// ---------------------------------------------------------------------------
// SystemClipboard
// ---------------------------------------------------------------------------

/// [`ClipboardService`] over `arboard`.
pub struct SystemClipboard;

impl SystemClipboard {
    /// Probe the platform clipboard once so startup can decide whether the
    /// CLIPBOARD action is available at all (e.g. headless session).
    pub fn new() -> Result<Self, ClipboardError> {
        Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        Ok(Self)
    }

    fn open() -> Result<Clipboard, ClipboardError> {
        Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))
    }
}

impl ClipboardService for SystemClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        let mut clipboard = Self::open()?;
        match clipboard.get_text() {
            Ok(text) => Ok(text.trim().to_string()),
            // Empty or non-text content is simply "nothing there".
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Get(e.to_string())),
        }
    }

    fn write(&self, content: &str) -> Result<(), ClipboardError> {
        let mut clipboard = Self::open()?;
        clipboard
            .set_text(content)
            .map_err(|e| ClipboardError::Set(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The orchestrator holds the clipboard behind this trait object.
    /// Construction itself needs a real display server, so tests stop at
    /// object safety.
    #[test]
    fn clipboard_service_is_object_safe() {
        fn assert_usable(_s: &dyn ClipboardService) {}
        struct Fake;
        impl ClipboardService for Fake {
            fn read(&self) -> Result<String, ClipboardError> {
                Ok(String::new())
            }
            fn write(&self, _content: &str) -> Result<(), ClipboardError> {
                Ok(())
            }
        }
        assert_usable(&Fake);
    }
}
