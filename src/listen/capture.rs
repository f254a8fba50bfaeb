//! Free-form command capture following a wake event.
//!
//! Runs an open-vocabulary recognizer session under two time bounds:
//!
//! * a **hard ceiling** on the whole capture, and
//! * a **silence window** that is (re)armed whenever the decoder stops
//!   hearing speech and cancelled while it hears it.
//!
//! Internally a two-state machine — Speaking / Silent — driven by each
//! accepted frame's [`SessionEvent`].  Whichever bound elapses first (or the
//! queue closing) finalizes the session; capture then returns everything the
//! decoder produced, finalized fragments joined by single spaces.

use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::audio::FrameReceiver;
use crate::stt::{SessionEvent, SpeechEngine, SttError};

/// Capture one spoken command from the frame queue.
///
/// Starts in the Silent state with the silence window armed, so a wake event
/// followed by nothing at all returns an empty string after `silence_window`
/// rather than hanging until the ceiling.  If the queue closes mid-capture,
/// whatever text accumulated so far is returned.
pub async fn capture_command(
    frames: &mut FrameReceiver,
    engine: &dyn SpeechEngine,
    silence_window: Duration,
    max_listen: Duration,
) -> Result<String, SttError> {
    let mut session = engine.command_session()?;

    let hard_deadline = Instant::now() + max_listen;
    let mut silence_deadline = Some(Instant::now() + silence_window);
    let mut pieces: Vec<String> = Vec::new();

    loop {
        let deadline = match silence_deadline {
            Some(silence) if silence < hard_deadline => silence,
            _ => hard_deadline,
        };

        match timeout_at(deadline, frames.recv()).await {
            // A bound elapsed — the command is over.
            Err(_) => break,
            // Queue closed (shutdown) — return what we have.
            Ok(None) => break,
            Ok(Some(frame)) => match session.accept(&frame)? {
                SessionEvent::Finalized(text) => {
                    if !text.is_empty() {
                        pieces.push(text);
                    }
                    // An endpoint means the speaker paused: enter Silent.
                    silence_deadline = Some(Instant::now() + silence_window);
                }
                SessionEvent::Speech => {
                    // Speaking: the silence timer must not fire mid-sentence.
                    silence_deadline = None;
                }
                SessionEvent::Silence => {
                    if silence_deadline.is_none() {
                        silence_deadline = Some(Instant::now() + silence_window);
                    }
                }
            },
        }
    }

    let tail = session.finalize();
    if !tail.is_empty() {
        pieces.push(tail);
    }

    Ok(pieces.join(" ").trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{frame_queue, FrameSender};
    use crate::stt::ScriptedEngine;

    const SILENCE: Duration = Duration::from_millis(50);
    const CEILING: Duration = Duration::from_secs(5);

    async fn feed_frames(tx: &FrameSender, count: usize) {
        for _ in 0..count {
            tx.send(vec![0_i16; 16]).await.unwrap();
        }
    }

    #[tokio::test]
    async fn silence_window_finalizes_the_capture() {
        let engine = ScriptedEngine {
            command_script: vec![
                SessionEvent::Speech,
                SessionEvent::Speech,
                SessionEvent::Finalized("note buy milk".into()),
            ],
            ..ScriptedEngine::silent()
        };

        let (tx, mut rx) = frame_queue();
        feed_frames(&tx, 3).await;
        // Channel stays open but silent — the silence window must fire.

        let text = capture_command(&mut rx, &engine, SILENCE, CEILING)
            .await
            .unwrap();
        assert_eq!(text, "note buy milk");
    }

    #[tokio::test]
    async fn queue_closure_returns_accumulated_text() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Speech, SessionEvent::Finalized("hello".into())],
            command_tail: "world".into(),
            ..ScriptedEngine::silent()
        };

        let (tx, mut rx) = frame_queue();
        feed_frames(&tx, 2).await;
        drop(tx);

        let text = capture_command(&mut rx, &engine, SILENCE, CEILING)
            .await
            .unwrap();
        assert_eq!(text, "hello world");
    }

    /// A speaker who never pauses is cut off by the hard ceiling.
    #[tokio::test]
    async fn hard_ceiling_bounds_the_capture() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Speech; 1000],
            command_tail: "trailing words".into(),
            ..ScriptedEngine::silent()
        };

        let (tx, mut rx) = frame_queue();
        let feeder = tokio::spawn(async move {
            loop {
                if tx.send(vec![0_i16; 16]).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let started = std::time::Instant::now();
        let text = capture_command(
            &mut rx,
            &engine,
            Duration::from_secs(5),
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(text, "trailing words");
        feeder.abort();
    }

    #[tokio::test]
    async fn finalized_fragments_join_with_single_spaces() {
        let engine = ScriptedEngine {
            command_script: vec![
                SessionEvent::Finalized("one".into()),
                SessionEvent::Finalized("two".into()),
            ],
            command_tail: "three".into(),
            ..ScriptedEngine::silent()
        };

        let (tx, mut rx) = frame_queue();
        feed_frames(&tx, 2).await;
        drop(tx);

        let text = capture_command(&mut rx, &engine, SILENCE, CEILING)
            .await
            .unwrap();
        assert_eq!(text, "one two three");
    }

    /// Wake with no command at all resolves quickly and empty.
    #[tokio::test]
    async fn no_speech_returns_empty_after_silence_window() {
        let engine = ScriptedEngine::silent();
        let (_tx, mut rx) = frame_queue();

        let started = std::time::Instant::now();
        let text = capture_command(&mut rx, &engine, SILENCE, CEILING)
            .await
            .unwrap();

        assert_eq!(text, "");
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
