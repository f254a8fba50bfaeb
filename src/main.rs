//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Load [`AppConfig`] from disk (defaults on first run, `HARK_*` env
//!    overrides applied).
//! 2. Initialise logging at the configured minimum severity.
//! 3. Load the Vosk model and open the microphone — both fatal on failure.
//! 4. Build the tool adapters; clipboard, TTS, and screenshots degrade to
//!    "unavailable" instead of blocking startup.
//! 5. Wire Ctrl-C to the shutdown signal and run the orchestrator until it
//!    is cancelled.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;

use hark::audio::{AudioAdapter, CpalAdapter, CpalCapture};
use hark::config::AppConfig;
use hark::llm::{LanguageModel, OllamaClient, VisionModel};
use hark::memory::ContextMemory;
use hark::orchestrator::{ListenParams, Orchestrator, OrchestratorError};
use hark::stt::{SpeechEngine, VoskEngine};
use hark::tools::{
    Calculator, ClipboardService, Clock, CommandSpeaker, CountdownTimers, DailyNotes,
    DesktopNotifier, ExprCalculator, NoteStore, Notifier, ScreenCapture, ScreenshotTool,
    SpeechOutput, SystemClipboard, SystemClock, TimerService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration
    let config = AppConfig::load().context("failed to load settings.toml")?;

    // 2. Logging, at the severity the config asks for
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    )
    .init();
    log::info!(
        "hark starting up (model: {}, llm: {})",
        config.stt.model_path,
        config.llm.model
    );

    // 3. Speech engine and microphone — fatal when absent
    let engine: Arc<dyn SpeechEngine> = Arc::new(
        VoskEngine::load(&config.stt.model_path, config.audio.sample_rate)
            .context("failed to initialise the speech engine")?,
    );

    let capture = CpalCapture::new(config.audio.sample_rate)
        .context("failed to open the default microphone")?;
    let (chunk_tx, chunk_rx) = std::sync::mpsc::channel();
    let _stream_handle = capture
        .start(chunk_tx)
        .context("failed to start the capture stream")?;
    let recorder: Arc<dyn AudioAdapter> =
        Arc::new(CpalAdapter::new(chunk_rx, config.audio.frame_size));

    // 4. Tool adapters
    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new());

    let timer_notifier = Arc::clone(&notifier);
    let timers: Arc<dyn TimerService> = Arc::new(CountdownTimers::new(Arc::new(move |name| {
        let notifier = Arc::clone(&timer_notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify("Hark", &format!("Time is up: {name}")).await {
                log::debug!("timer notification failed: {e}");
            }
        });
    })));

    let notes: Arc<dyn NoteStore> = Arc::new(DailyNotes::new(
        &config.notes.vault_path,
        &config.notes.prefix,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let calc: Arc<dyn Calculator> = Arc::new(ExprCalculator::new());

    let clipboard: Option<Arc<dyn ClipboardService>> = match SystemClipboard::new() {
        Ok(clipboard) => Some(Arc::new(clipboard)),
        Err(e) => {
            log::warn!("clipboard unavailable: {e}");
            None
        }
    };

    let speech: Option<Arc<dyn SpeechOutput>> = if config.tts.enabled {
        let speaker = CommandSpeaker::new(&config.tts.command);
        if !speaker.is_available() {
            log::warn!("TTS enabled but command '{}' not found", config.tts.command);
        }
        Some(Arc::new(speaker))
    } else {
        None
    };

    let mut screen: Option<Arc<dyn ScreenCapture>> = None;
    let mut vision: Option<Arc<dyn VisionModel>> = None;
    if config.vision.enabled {
        match ScreenshotTool::detect() {
            Some(tool) => {
                log::info!("screen capture available using: {}", tool.backend());
                log::info!("vision model configured: {}", config.vision.model);
                screen = Some(Arc::new(tool));
                vision = Some(Arc::new(OllamaClient::new(
                    &config.llm,
                    &config.vision.model,
                )));
            }
            None => log::warn!(
                "vision enabled but no screenshot tool found \
                 (install gnome-screenshot, scrot, or grim)"
            ),
        }
    }

    let llm: Arc<dyn LanguageModel> = Arc::new(OllamaClient::from_config(&config.llm));

    // 5. Orchestrator + shutdown wiring
    let orchestrator = Orchestrator {
        recorder,
        engine,
        notifier,
        llm,
        vision,
        notes,
        timers,
        clock,
        speech,
        clipboard,
        calc,
        screen,
        memory: ContextMemory::new(config.memory.capacity),
        listening: ListenParams::from_config(&config.stt),
        on_state_change: Some(Box::new(|state| {
            log::debug!("state: {}", state.label());
        })),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    match orchestrator.start(shutdown_rx).await {
        Err(OrchestratorError::Cancelled) => {
            log::info!("hark stopped");
            Ok(())
        }
        Err(e) => Err(e).context("orchestrator stopped unexpectedly"),
        Ok(()) => Ok(()),
    }
}
