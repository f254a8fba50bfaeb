//! Vosk-backed [`SpeechEngine`].
//!
//! The model is loaded once at startup (slow, fatal on failure); recognizers
//! are created per session.  Vosk's grammar-constrained recognizer keeps the
//! wake-word pass cheap and low-false-positive compared to open-vocabulary
//! decoding of the same stream.

use vosk::{CompleteResult, DecodingState, Model, Recognizer};

use super::engine::{RecognizerSession, SessionEvent, SpeechEngine, SttError};

// ---------------------------------------------------------------------------
// VoskEngine
// ---------------------------------------------------------------------------

/// Holds the loaded Vosk model and hands out per-call recognizers.
pub struct VoskEngine {
    model: Model,
    sample_rate: f32,
}

impl VoskEngine {
    /// Load the model directory at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns [`SttError::ModelLoad`] when the directory is missing or not a
    /// valid Vosk model.  Callers should treat this as fatal — nothing works
    /// without a model.
    pub fn load(model_path: &str, sample_rate: u32) -> Result<Self, SttError> {
        let model =
            Model::new(model_path).ok_or_else(|| SttError::ModelLoad(model_path.to_string()))?;
        Ok(Self {
            model,
            sample_rate: sample_rate as f32,
        })
    }
}

impl SpeechEngine for VoskEngine {
    fn wake_session(&self, grammar: &[String]) -> Result<Box<dyn RecognizerSession>, SttError> {
        let recognizer = Recognizer::new_with_grammar(&self.model, self.sample_rate, grammar)
            .ok_or(SttError::RecognizerInit)?;
        Ok(Box::new(VoskSession { recognizer }))
    }

    fn command_session(&self) -> Result<Box<dyn RecognizerSession>, SttError> {
        let recognizer =
            Recognizer::new(&self.model, self.sample_rate).ok_or(SttError::RecognizerInit)?;
        Ok(Box::new(VoskSession { recognizer }))
    }
}

// ---------------------------------------------------------------------------
// VoskSession
// ---------------------------------------------------------------------------

struct VoskSession {
    recognizer: Recognizer,
}

impl RecognizerSession for VoskSession {
    fn accept(&mut self, frame: &[i16]) -> Result<SessionEvent, SttError> {
        let state = self
            .recognizer
            .accept_waveform(frame)
            .map_err(|e| SttError::Decode(format!("{e:?}")))?;

        match state {
            DecodingState::Finalized => {
                let text = complete_text(self.recognizer.result());
                Ok(SessionEvent::Finalized(text))
            }
            DecodingState::Running => {
                if self.recognizer.partial_result().partial.trim().is_empty() {
                    Ok(SessionEvent::Silence)
                } else {
                    Ok(SessionEvent::Speech)
                }
            }
            DecodingState::Failed => {
                // Transient decode hiccup on one chunk; the stream continues.
                log::debug!("vosk: decode failed for current chunk");
                Ok(SessionEvent::Silence)
            }
        }
    }

    fn finalize(&mut self) -> String {
        complete_text(self.recognizer.final_result())
    }
}

/// Extract the best-hypothesis text from a Vosk result.
fn complete_text(result: CompleteResult) -> String {
    match result {
        CompleteResult::Single(single) => single.text.trim().to_string(),
        CompleteResult::Multiple(multiple) => multiple
            .alternatives
            .first()
            .map(|alt| alt.text.trim().to_string())
            .unwrap_or_default(),
    }
}
