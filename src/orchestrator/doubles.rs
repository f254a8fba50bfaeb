//! Test doubles for the orchestrator's collaborators.
//!
//! Shared by the runner and dispatch test modules: every capability trait
//! gets a recording or scripted stand-in, and [`harness`] wires a complete
//! [`Orchestrator`] from them with handles left out for assertions.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::audio::{AudioAdapter, AudioError, AudioFrame};
use crate::llm::{LanguageModel, LlmError, VisionModel};
use crate::memory::ContextMemory;
use crate::stt::ScriptedEngine;
use crate::tools::{
    Calculator, ClipboardError, ClipboardService, Clock, ExprCalculator, NoteStore, NotesError,
    Notifier, NotifyError, ScreenCapture, ScreenError, Screenshot, TimerService,
};

use super::runner::{ListenParams, Orchestrator};

// ---------------------------------------------------------------------------
// Collaborator doubles
// ---------------------------------------------------------------------------

/// Adapter that yields short frames at a steady trickle.
pub(crate) struct TickAdapter;

impl AudioAdapter for TickAdapter {
    fn read_frame(&self) -> Result<AudioFrame, AudioError> {
        std::thread::sleep(Duration::from_millis(2));
        Ok(vec![0_i16; 16])
    }
}

/// Records every notification.
pub(crate) struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

/// In-memory note store: a plain vec of entry texts.
pub(crate) struct VecNoteStore {
    pub entries: Mutex<Vec<String>>,
    failing: AtomicUsize,
}

impl VecNoteStore {
    pub fn fail_writes(&self) {
        self.failing.store(1, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), NotesError> {
        if self.failing.load(Ordering::SeqCst) != 0 {
            return Err(NotesError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        Ok(())
    }
}

impl NoteStore for VecNoteStore {
    fn append_daily(&self, content: &str) -> Result<(), NotesError> {
        self.check()?;
        self.entries.lock().unwrap().push(content.to_string());
        Ok(())
    }

    fn rewrite_last(&self, content: &str) -> Result<(), NotesError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        entries.pop();
        entries.push(content.to_string());
        Ok(())
    }

    fn delete_last(&self) -> Result<(), NotesError> {
        self.entries
            .lock()
            .unwrap()
            .pop()
            .map(|_| ())
            .ok_or(NotesError::NoEntries)
    }
}

/// Records started timers; `cancel_all` reports a configurable live count.
pub(crate) struct RecordingTimers {
    pub started: Mutex<Vec<(String, Duration)>>,
    active: AtomicUsize,
}

impl RecordingTimers {
    pub fn set_active(&self, count: usize) {
        self.active.store(count, Ordering::SeqCst);
    }

    pub fn active_now(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl TimerService for RecordingTimers {
    fn start(&self, name: &str, duration: Duration) {
        self.started
            .lock()
            .unwrap()
            .push((name.to_string(), duration));
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel_all(&self) -> usize {
        self.active.swap(0, Ordering::SeqCst)
    }

    fn active_count(&self) -> usize {
        self.active_now()
    }
}

/// Always noon.
pub(crate) struct FixedClock;

impl Clock for FixedClock {
    fn current_time(&self) -> String {
        "12:00".into()
    }
}

/// In-memory clipboard.
pub(crate) struct MemClipboard {
    content: Mutex<String>,
}

impl MemClipboard {
    pub fn set(&self, content: &str) {
        *self.content.lock().unwrap() = content.to_string();
    }

    pub fn get(&self) -> String {
        self.content.lock().unwrap().clone()
    }
}

impl ClipboardService for MemClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        Ok(self.content.lock().unwrap().trim().to_string())
    }

    fn write(&self, content: &str) -> Result<(), ClipboardError> {
        self.set(content);
        Ok(())
    }
}

/// Counts model calls and returns a fixed reply.
pub(crate) struct CountingLlm {
    reply: String,
    pub calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for CountingLlm {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Always times out.
pub(crate) struct FailingLlm;

#[async_trait]
impl LanguageModel for FailingLlm {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Timeout)
    }
}

/// Replies after a delay — lets frames pile up during "thinking".
struct SlowLlm {
    reply: String,
    delay: Duration,
}

#[async_trait]
impl LanguageModel for SlowLlm {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

pub(crate) fn slow_llm(reply: &str, delay: Duration) -> Arc<dyn LanguageModel> {
    Arc::new(SlowLlm {
        reply: reply.to_string(),
        delay,
    })
}

/// Times out after a delay, like a backend that stops answering.
struct SlowFailingLlm {
    delay: Duration,
}

#[async_trait]
impl LanguageModel for SlowFailingLlm {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        tokio::time::sleep(self.delay).await;
        Err(LlmError::Timeout)
    }
}

pub(crate) fn slow_failing_llm(delay: Duration) -> Arc<dyn LanguageModel> {
    Arc::new(SlowFailingLlm { delay })
}

/// Fixed vision reply.
pub(crate) struct FixedVision;

#[async_trait]
impl VisionModel for FixedVision {
    async fn generate_with_images(
        &self,
        _system: &str,
        _prompt: &str,
        _images: &[String],
    ) -> Result<String, LlmError> {
        Ok("A tidy desktop.".into())
    }
}

/// Always fails analysis.
pub(crate) struct FailingVision;

#[async_trait]
impl VisionModel for FailingVision {
    async fn generate_with_images(
        &self,
        _system: &str,
        _prompt: &str,
        _images: &[String],
    ) -> Result<String, LlmError> {
        Err(LlmError::Request("vision backend down".into()))
    }
}

/// Records captures and cleanups without touching the filesystem.
pub(crate) struct RecordingScreen {
    window_captures: AtomicUsize,
    cleaned: Mutex<Vec<PathBuf>>,
}

impl RecordingScreen {
    pub fn window_captures(&self) -> usize {
        self.window_captures.load(Ordering::SeqCst)
    }

    pub fn cleaned_count(&self) -> usize {
        self.cleaned.lock().unwrap().len()
    }

    fn shot(&self) -> Screenshot {
        Screenshot {
            base64: "aW1n".into(),
            path: PathBuf::from("/tmp/hark-test-shot.png"),
        }
    }
}

impl ScreenCapture for RecordingScreen {
    fn capture(&self) -> Result<Screenshot, ScreenError> {
        Ok(self.shot())
    }

    fn capture_window(&self) -> Result<Screenshot, ScreenError> {
        self.window_captures.fetch_add(1, Ordering::SeqCst);
        Ok(self.shot())
    }

    fn cleanup(&self, path: &std::path::Path) -> Result<(), ScreenError> {
        self.cleaned.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Calculator passthrough — the real one is already pure and fast.
pub(crate) fn real_calc() -> Arc<dyn Calculator> {
    Arc::new(ExprCalculator::new())
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A fully wired orchestrator plus handles to its doubles.
pub(crate) struct Harness {
    pub orchestrator: Orchestrator,
    pub notifier: Arc<RecordingNotifier>,
    pub notes: Arc<VecNoteStore>,
    pub timers: Arc<RecordingTimers>,
    pub clipboard: Arc<MemClipboard>,
    pub screen: Arc<RecordingScreen>,
    llm: Arc<CountingLlm>,
}

impl Harness {
    pub fn llm_calls(&self) -> usize {
        self.llm.calls.load(Ordering::SeqCst)
    }

    pub fn fail_llm(&mut self) {
        self.orchestrator.llm = Arc::new(FailingLlm);
    }

    pub fn fail_vision(&mut self) {
        self.orchestrator.vision = Some(Arc::new(FailingVision));
    }
}

/// Build a harness whose language model always answers `reply` and whose
/// speech engine follows `engine`'s scripts.
pub(crate) fn harness(reply: &str, engine: ScriptedEngine) -> Harness {
    let notifier = Arc::new(RecordingNotifier {
        messages: Mutex::new(Vec::new()),
    });
    let notes = Arc::new(VecNoteStore {
        entries: Mutex::new(Vec::new()),
        failing: AtomicUsize::new(0),
    });
    let timers = Arc::new(RecordingTimers {
        started: Mutex::new(Vec::new()),
        active: AtomicUsize::new(0),
    });
    let clipboard = Arc::new(MemClipboard {
        content: Mutex::new(String::new()),
    });
    let screen = Arc::new(RecordingScreen {
        window_captures: AtomicUsize::new(0),
        cleaned: Mutex::new(Vec::new()),
    });
    let llm = Arc::new(CountingLlm {
        reply: reply.to_string(),
        calls: AtomicUsize::new(0),
    });

    let listening = ListenParams {
        silence_window: Duration::from_millis(100),
        max_listen: Duration::from_secs(2),
        ..ListenParams::default()
    };

    let orchestrator = Orchestrator {
        recorder: Arc::new(TickAdapter),
        engine: Arc::new(engine),
        notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
        llm: Arc::clone(&llm) as Arc<dyn LanguageModel>,
        vision: Some(Arc::new(FixedVision)),
        notes: Arc::clone(&notes) as Arc<dyn NoteStore>,
        timers: Arc::clone(&timers) as Arc<dyn TimerService>,
        clock: Arc::new(FixedClock),
        speech: None,
        clipboard: Some(Arc::clone(&clipboard) as Arc<dyn ClipboardService>),
        calc: real_calc(),
        screen: Some(Arc::clone(&screen) as Arc<dyn ScreenCapture>),
        memory: ContextMemory::new(10),
        listening,
        on_state_change: None,
    };

    Harness {
        orchestrator,
        notifier,
        notes,
        timers,
        clipboard,
        screen,
        llm,
    }
}
