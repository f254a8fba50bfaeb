//! hark — a wake-word voice agent for the desktop.
//!
//! Say the wake phrase, speak a command, and the agent classifies it with a
//! local language model and acts: notes, timers, the clock, the clipboard, a
//! calculator, or a screenshot description from a vision model.
//!
//! # Architecture
//!
//! ```text
//! microphone ─▶ audio::AudioFeed ─▶ bounded frame queue
//!                                        │
//!                      ┌─────────────────┴──────────────────┐
//!                      ▼ (Idle)                             ▼ (Listening)
//!            listen::await_wake_phrase           listen::capture_command
//!              constrained vocabulary              open vocabulary,
//!              via stt::SpeechEngine               silence + ceiling timers
//!                                                           │
//!                                                           ▼ (Thinking)
//!                              intent::PromptBuilder + llm::LanguageModel
//!                                                           │
//!                                                           ▼
//!                              orchestrator dispatch ─▶ tools::* adapters
//!                                                           │
//!                                                           ▼
//!                                      memory::ContextMemory (rolling window)
//! ```
//!
//! Everything with a side effect sits behind a capability trait, injected
//! into [`orchestrator::Orchestrator`] at startup and replaced by doubles in
//! tests.

pub mod audio;
pub mod config;
pub mod intent;
pub mod listen;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod stt;
pub mod tools;
