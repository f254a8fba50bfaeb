//! Spoken feedback via an external TTS command.
//!
//! Speech is best-effort decoration on top of notifications: the call
//! returns immediately, the synthesis runs on a background task, and errors
//! are logged and forgotten.

use crate::tools::find_in_path;

// ---------------------------------------------------------------------------
// SpeechOutput trait
// ---------------------------------------------------------------------------

/// Fire-and-forget speech capability.  No completion signal, no ordering
/// guarantee relative to later speech.
pub trait SpeechOutput: Send + Sync {
    fn speak_async(&self, text: &str);
}

// ---------------------------------------------------------------------------
// CommandSpeaker
// ---------------------------------------------------------------------------

/// [`SpeechOutput`] that spawns a TTS command (`espeak-ng`, `piper`, …)
/// with the text as its final argument.  Must be used inside a tokio
/// runtime; `speak_async` spawns onto the current runtime.
pub struct CommandSpeaker {
    command: String,
}

impl CommandSpeaker {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    /// Whether the configured command exists on `PATH`.
    pub fn is_available(&self) -> bool {
        !self.command.is_empty() && find_in_path(&self.command).is_some()
    }
}

impl SpeechOutput for CommandSpeaker {
    fn speak_async(&self, text: &str) {
        let command = self.command.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            match tokio::process::Command::new(&command).arg(&text).status().await {
                Ok(status) if status.success() => {}
                Ok(status) => log::debug!("tts '{command}' exited with {status}"),
                Err(e) => log::debug!("tts '{command}' failed to spawn: {e}"),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
