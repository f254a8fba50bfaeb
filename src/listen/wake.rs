//! Wake-phrase detection over the frame queue.
//!
//! Runs a constrained-vocabulary recognizer session against incoming frames
//! until it finalizes an utterance equal to the wake phrase.  The session is
//! created fresh for every call, so a failed or aborted attempt leaves no
//! decoder state behind.

use crate::audio::FrameReceiver;
use crate::stt::{SessionEvent, SpeechEngine, SttError};

/// Consume frames until the wake phrase is heard or the queue closes.
///
/// Returns `Ok(true)` when a finalized utterance matches `phrase` exactly,
/// `Ok(false)` when the queue closes first (shutdown).  Recognition errors
/// propagate to the caller, which logs and retries with a fresh call.
pub async fn await_wake_phrase(
    frames: &mut FrameReceiver,
    engine: &dyn SpeechEngine,
    grammar: &[String],
    phrase: &str,
) -> Result<bool, SttError> {
    let mut session = engine.wake_session(grammar)?;

    while let Some(frame) = frames.recv().await {
        if let SessionEvent::Finalized(text) = session.accept(&frame)? {
            if text == phrase {
                return Ok(true);
            }
            // Some other constrained-vocabulary utterance — keep listening.
            log::trace!("wake: heard {text:?}, not the wake phrase");
        }
    }

    Ok(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
