//! The orchestrator run loop.
//!
//! [`Orchestrator`] is a struct of capability trait objects — one field per
//! external collaborator — so tests substitute any of them with doubles and
//! `main` injects the real adapters once at startup.
//!
//! # Control flow
//!
//! ```text
//! start()
//!   ├─ spawn AudioFeed (its own thread, shared frame queue)
//!   └─ loop:                         ◀────────────────────────┐
//!        await_wake_phrase ── error → log, retry              │
//!            │ queue closed → return Cancelled                │
//!            ▼ detected                                       │
//!        handle_command: capture → prompt → generate →        │
//!                        parse → dispatch → drain stale audio ┘
//! ```
//!
//! Cancellation is observed between cycles; an in-flight recognizer or model
//! call runs to completion first, so shutdown latency is bounded by the
//! current cycle rather than being instantaneous.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::audio::{frame_queue, AudioAdapter, AudioFeed, FrameReceiver};
use crate::config::SttConfig;
use crate::intent::{parse_reply, PromptBuilder};
use crate::listen::{await_wake_phrase, capture_command};
use crate::llm::{LanguageModel, VisionModel};
use crate::memory::ContextMemory;
use crate::stt::SpeechEngine;
use crate::tools::{
    Calculator, ClipboardService, Clock, NoteStore, Notifier, ScreenCapture, SpeechOutput,
    TimerService,
};

use super::state::{AgentState, StateObserver};

// ---------------------------------------------------------------------------
// OrchestratorError
// ---------------------------------------------------------------------------

/// Terminal outcomes of [`Orchestrator::start`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The shutdown signal was observed.  This is the normal way out.
    #[error("cancelled by shutdown signal")]
    Cancelled,

    /// The frame queue closed without a shutdown request (the ingestion
    /// thread died).  Should not happen in practice.
    #[error("audio frame queue closed unexpectedly")]
    QueueClosed,
}

// ---------------------------------------------------------------------------
// ListenParams
// ---------------------------------------------------------------------------

/// Wake and capture parameters, lifted out of [`SttConfig`].
#[derive(Debug, Clone)]
pub struct ListenParams {
    pub wake_phrase: String,
    pub wake_grammar: Vec<String>,
    pub silence_window: Duration,
    pub max_listen: Duration,
}

impl ListenParams {
    pub fn from_config(config: &SttConfig) -> Self {
        Self {
            wake_phrase: config.wake_phrase.clone(),
            wake_grammar: config.wake_grammar.clone(),
            silence_window: Duration::from_secs(config.silence_secs),
            max_listen: Duration::from_secs(config.max_listen_secs),
        }
    }
}

impl Default for ListenParams {
    fn default() -> Self {
        Self::from_config(&SttConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Coordinates audio capture, recognition, intent classification, and tool
/// execution.  Optional fields (`vision`, `clipboard`, `screen`, `speech`)
/// degrade the matching actions to "unavailable" notifications when absent.
pub struct Orchestrator {
    pub recorder: Arc<dyn AudioAdapter>,
    pub engine: Arc<dyn SpeechEngine>,
    pub notifier: Arc<dyn Notifier>,
    pub llm: Arc<dyn LanguageModel>,
    pub vision: Option<Arc<dyn VisionModel>>,
    pub notes: Arc<dyn NoteStore>,
    pub timers: Arc<dyn TimerService>,
    pub clock: Arc<dyn Clock>,
    pub speech: Option<Arc<dyn SpeechOutput>>,
    pub clipboard: Option<Arc<dyn ClipboardService>>,
    pub calc: Arc<dyn Calculator>,
    pub screen: Option<Arc<dyn ScreenCapture>>,
    pub memory: ContextMemory,
    pub listening: ListenParams,
    pub on_state_change: Option<StateObserver>,
}

impl Orchestrator {
    /// Run until the shutdown signal fires.
    ///
    /// Spawns the audio ingestion thread, then alternates wake detection and
    /// command handling against the shared frame queue.  Always returns an
    /// error: [`OrchestratorError::Cancelled`] on orderly shutdown.
    pub async fn start(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), OrchestratorError> {
        log::info!(
            "listening for wake phrase {:?}",
            self.listening.wake_phrase
        );
        self.set_state(AgentState::Idle);

        let (tx, mut rx) = frame_queue();
        let _feed_handle = AudioFeed::new(Arc::clone(&self.recorder)).spawn(tx, shutdown.clone());

        loop {
            // Cancellation is checked between command cycles only.
            if *shutdown.borrow() {
                return Err(OrchestratorError::Cancelled);
            }

            match await_wake_phrase(
                &mut rx,
                &*self.engine,
                &self.listening.wake_grammar,
                &self.listening.wake_phrase,
            )
            .await
            {
                Err(e) => {
                    log::warn!("wake word error: {e}");
                    continue;
                }
                Ok(false) => {
                    // Queue closed: the feed observed shutdown (normal) or
                    // died on its own (not normal).
                    return if *shutdown.borrow() {
                        Err(OrchestratorError::Cancelled)
                    } else {
                        Err(OrchestratorError::QueueClosed)
                    };
                }
                Ok(true) => {
                    self.handle_command(&mut rx).await;
                    self.set_state(AgentState::Idle);
                }
            }
        }
    }

    /// One full command cycle: capture → classify → dispatch → drain.
    async fn handle_command(&self, frames: &mut FrameReceiver) {
        self.command_cycle(frames).await;

        // Drain frames that queued up during capture and dispatch, so the
        // next wake pass does not replay stale audio ("ghost" triggers).
        // Runs on every exit path; an aborted cycle (a timed-out model call,
        // say) leaves the most audio behind.
        while frames.try_recv().is_ok() {}
    }

    async fn command_cycle(&self, frames: &mut FrameReceiver) {
        log::info!("wake phrase detected");
        self.set_state(AgentState::Listening);
        self.notify("Hark", "Listening...").await;

        let text = match capture_command(
            frames,
            &*self.engine,
            self.listening.silence_window,
            self.listening.max_listen,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                log::error!("transcription error: {e}");
                return;
            }
        };
        log::debug!("transcribed: {text:?}");

        if text.is_empty() {
            return;
        }

        self.set_state(AgentState::Thinking);

        let prompt = PromptBuilder::new().build(&self.memory.history(), &text);
        let raw_reply = match self.llm.generate("", &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("language model error: {e}");
                self.notify("Hark Error", "Language model failed").await;
                return;
            }
        };
        log::debug!("model reply: {raw_reply:?}");

        let intent = parse_reply(&raw_reply);
        log::info!(
            "parsed action: {}, arg: {:?}",
            intent.action.name(),
            intent.argument
        );

        self.dispatch(&intent, &text).await;
    }

    // -----------------------------------------------------------------------
    // Shared helpers (also used by the dispatch handlers)
    // -----------------------------------------------------------------------

    pub(crate) fn set_state(&self, state: AgentState) {
        if let Some(observer) = &self.on_state_change {
            observer(state);
        }
    }

    /// Notify, logging instead of failing — notifications are feedback, not
    /// control flow.
    pub(crate) async fn notify(&self, title: &str, message: &str) {
        if let Err(e) = self.notifier.notify(title, message).await {
            log::debug!("notification failed: {e}");
        }
    }

    /// Speak if a speech output is configured; silent no-op otherwise.
    pub(crate) fn speak(&self, text: &str) {
        if let Some(speech) = &self.speech {
            speech.speak_async(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::doubles::{harness, slow_failing_llm, slow_llm, Harness};
    use crate::stt::{ScriptedEngine, SessionEvent};

    fn notifications(h: &Harness) -> Vec<(String, String)> {
        h.notifier.messages.lock().unwrap().clone()
    }

    /// The Go-era happy path: wake → "запиши тест" → NOTE → note saved,
    /// success notification, memory entry recorded.
    #[tokio::test]
    async fn full_command_cycle_saves_a_note() {
        let engine = ScriptedEngine {
            command_script: vec![
                SessionEvent::Speech,
                SessionEvent::Finalized("запиши тест".into()),
            ],
            ..ScriptedEngine::silent()
        };
        let h = harness("ACTION: NOTE | ARG: тест", engine);

        let (tx, mut rx) = frame_queue();
        for _ in 0..2 {
            tx.send(vec![0_i16; 16]).await.unwrap();
        }
        drop(tx);

        h.orchestrator.handle_command(&mut rx).await;

        assert_eq!(*h.notes.entries.lock().unwrap(), ["тест"]);
        assert!(notifications(&h).contains(&("Hark".into(), "Note saved".into())));

        let history = h.orchestrator.memory.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].command, "запиши тест");
        assert!(history[0].action.contains("тест"));
    }

    /// An UPDATE argument must rewrite, not append, and the stored text
    /// must have the prefix stripped.
    #[tokio::test]
    async fn update_flow_rewrites_the_last_note() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Finalized("исправь на кефир".into())],
            ..ScriptedEngine::silent()
        };
        let h = harness("ACTION: NOTE | ARG: UPDATE: купить кефир", engine);
        h.notes.entries.lock().unwrap().push("купить хлеб".into());

        let (tx, mut rx) = frame_queue();
        tx.send(vec![0_i16; 16]).await.unwrap();
        drop(tx);

        h.orchestrator.handle_command(&mut rx).await;

        assert_eq!(
            *h.notes.entries.lock().unwrap(),
            ["купить кефир"],
            "rewrite must replace the existing entry with the stripped text"
        );
    }

    /// Empty transcription returns to idle silently: no model call, no
    /// notification beyond "Listening...".
    #[tokio::test]
    async fn empty_transcription_skips_the_thinking_phase() {
        let h = harness("ACTION: TIME | ARG: none", ScriptedEngine::silent());

        let (tx, mut rx) = frame_queue();
        drop(tx);

        h.orchestrator.handle_command(&mut rx).await;

        assert_eq!(h.llm_calls(), 0, "model must not be consulted");
        assert_eq!(notifications(&h).len(), 1, "only the Listening notice");
        assert!(h.orchestrator.memory.is_empty());
    }

    /// A model failure aborts the cycle with a notification and no memory
    /// write.
    #[tokio::test]
    async fn llm_failure_aborts_the_cycle() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Finalized("note something".into())],
            ..ScriptedEngine::silent()
        };
        let mut h = harness("unused", engine);
        h.fail_llm();

        let (tx, mut rx) = frame_queue();
        tx.send(vec![0_i16; 16]).await.unwrap();
        drop(tx);

        h.orchestrator.handle_command(&mut rx).await;

        assert!(notifications(&h)
            .contains(&("Hark Error".into(), "Language model failed".into())));
        assert!(h.orchestrator.memory.is_empty());
    }

    /// Frames that arrive while the model is thinking are drained before the
    /// next wake pass.
    #[tokio::test]
    async fn stale_audio_is_drained_after_dispatch() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Finalized("what time is it".into())],
            ..ScriptedEngine::silent()
        };
        let mut h = harness("ACTION: TIME | ARG: none", engine);
        // Model takes a while — plenty of time for frames to pile up.
        h.orchestrator.llm = slow_llm(
            "ACTION: TIME | ARG: none",
            std::time::Duration::from_millis(150),
        );

        let (tx, mut rx) = frame_queue();
        let feeder = tokio::spawn(async move {
            for _ in 0..20 {
                if tx.send(vec![0_i16; 16]).await.is_err() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
            // Sender dropped here; 20 frames were offered in ~100 ms.
        });

        h.orchestrator.handle_command(&mut rx).await;
        feeder.await.unwrap();

        assert!(
            rx.try_recv().is_err(),
            "no stale frames may survive the drain step"
        );
    }

    /// An aborted cycle (model timeout) must still drain — that is exactly
    /// when the most stale audio has piled up.
    #[tokio::test]
    async fn stale_audio_is_drained_after_llm_failure() {
        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Finalized("note something".into())],
            ..ScriptedEngine::silent()
        };
        let mut h = harness("unused", engine);
        h.orchestrator.llm = slow_failing_llm(std::time::Duration::from_millis(150));

        let (tx, mut rx) = frame_queue();
        let feeder = tokio::spawn(async move {
            for _ in 0..20 {
                if tx.send(vec![0_i16; 16]).await.is_err() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        });

        h.orchestrator.handle_command(&mut rx).await;
        feeder.await.unwrap();

        assert!(notifications(&h)
            .contains(&("Hark Error".into(), "Language model failed".into())));
        assert!(
            rx.try_recv().is_err(),
            "drain must run on the failure path too"
        );
    }

    /// Cancelling during an idle (no-wake) loop makes `start` return a
    /// cancellation error promptly — within a recognizer call, not instantly.
    #[tokio::test]
    async fn shutdown_during_idle_loop_returns_cancelled() {
        let h = harness("unused", ScriptedEngine::silent());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            let _ = shutdown_tx.send(true);
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            h.orchestrator.start(shutdown_rx),
        )
        .await
        .expect("start must unwind well before the timeout");

        assert!(matches!(result, Err(OrchestratorError::Cancelled)));
    }

    /// Every transition is visible to the state observer, ending at Idle.
    #[tokio::test]
    async fn state_observer_sees_the_full_cycle() {
        use std::sync::{Arc as StdArc, Mutex};

        let engine = ScriptedEngine {
            command_script: vec![SessionEvent::Finalized("what time is it".into())],
            ..ScriptedEngine::silent()
        };
        let mut h = harness("ACTION: TIME | ARG: none", engine);

        let seen: StdArc<Mutex<Vec<AgentState>>> = StdArc::new(Mutex::new(Vec::new()));
        let seen_clone = StdArc::clone(&seen);
        h.orchestrator.on_state_change = Some(Box::new(move |state| {
            seen_clone.lock().unwrap().push(state);
        }));

        let (tx, mut rx) = frame_queue();
        tx.send(vec![0_i16; 16]).await.unwrap();
        drop(tx);

        h.orchestrator.handle_command(&mut rx).await;

        let states = seen.lock().unwrap().clone();
        assert_eq!(states, vec![AgentState::Listening, AgentState::Thinking]);
    }
}
