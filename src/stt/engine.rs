//! Recognition engine seam.
//!
//! The orchestration core owns the *timing* of listening (silence windows,
//! hard ceilings, wake-phrase matching); the engine owns the *acoustics*.
//! The seam between them is deliberately small:
//!
//! * [`SpeechEngine`] hands out fresh [`RecognizerSession`]s — one
//!   constrained-vocabulary session per wake attempt, one open-vocabulary
//!   session per command capture.  Sessions carry no state between calls.
//! * [`RecognizerSession::accept`] consumes one audio frame and reports what
//!   the decoder made of it as a [`SessionEvent`].
//!
//! Concrete implementation: [`VoskEngine`](crate::stt::VoskEngine).

use thiserror::Error;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading models or decoding audio.
#[derive(Debug, Error)]
pub enum SttError {
    /// The model directory could not be loaded.  Fatal at startup.
    #[error("failed to load speech model from {0}")]
    ModelLoad(String),

    /// A recognizer could not be constructed from the loaded model.
    #[error("failed to create recognizer")]
    RecognizerInit,

    /// The decoder rejected a waveform buffer.
    #[error("recognizer rejected waveform: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// What the decoder reported for one accepted frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// An utterance was finalized (the decoder hit an endpoint).
    Finalized(String),
    /// The decoder currently hears speech (non-empty partial hypothesis).
    Speech,
    /// The decoder currently hears nothing.
    Silence,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One live recognizer over a stream of frames.
///
/// Sessions are cheap and single-use: the listeners create a fresh one per
/// wake attempt / command capture, so a failed attempt never leaks decoder
/// state into the next.
pub trait RecognizerSession: Send {
    /// Feed one frame of 16-bit mono samples to the decoder.
    fn accept(&mut self, frame: &[i16]) -> Result<SessionEvent, SttError>;

    /// Flush the decoder and return any remaining text (possibly empty).
    fn finalize(&mut self) -> String;
}

/// Factory for recognizer sessions, shared across the process lifetime.
pub trait SpeechEngine: Send + Sync {
    /// A constrained-vocabulary session for wake-phrase spotting.
    ///
    /// `grammar` is the full allowed vocabulary: the wake phrase, a handful
    /// of command-starter words, and the `"[unk]"` fallback token.
    fn wake_session(&self, grammar: &[String]) -> Result<Box<dyn RecognizerSession>, SttError>;

    /// An open-vocabulary session for free-form command capture.
    fn command_session(&self) -> Result<Box<dyn RecognizerSession>, SttError>;
}

// ---------------------------------------------------------------------------
// Scripted test doubles
// ---------------------------------------------------------------------------

/// Session that replays a fixed script of events, then reports silence.
#[cfg(test)]
pub struct ScriptedSession {
    script: std::collections::VecDeque<SessionEvent>,
    tail: String,
}

#[cfg(test)]
impl ScriptedSession {
    pub fn new(script: Vec<SessionEvent>, tail: &str) -> Self {
        Self {
            script: script.into(),
            tail: tail.to_string(),
        }
    }
}

#[cfg(test)]
impl RecognizerSession for ScriptedSession {
    fn accept(&mut self, _frame: &[i16]) -> Result<SessionEvent, SttError> {
        Ok(self.script.pop_front().unwrap_or(SessionEvent::Silence))
    }

    fn finalize(&mut self) -> String {
        std::mem::take(&mut self.tail)
    }
}

/// Engine that hands out clones of pre-baked wake / command scripts.
#[cfg(test)]
pub struct ScriptedEngine {
    pub wake_script: Vec<SessionEvent>,
    pub command_script: Vec<SessionEvent>,
    pub command_tail: String,
}

#[cfg(test)]
impl ScriptedEngine {
    /// Engine whose wake session never fires and whose command session hears
    /// nothing — useful for cancellation tests.
    pub fn silent() -> Self {
        Self {
            wake_script: Vec::new(),
            command_script: Vec::new(),
            command_tail: String::new(),
        }
    }
}

#[cfg(test)]
impl SpeechEngine for ScriptedEngine {
    fn wake_session(&self, _grammar: &[String]) -> Result<Box<dyn RecognizerSession>, SttError> {
        Ok(Box::new(ScriptedSession::new(
            self.wake_script.clone(),
            "",
        )))
    }

    fn command_session(&self) -> Result<Box<dyn RecognizerSession>, SttError> {
        Ok(Box::new(ScriptedSession::new(
            self.command_script.clone(),
            &self.command_tail,
        )))
    }
}
