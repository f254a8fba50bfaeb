//! Speech recognition module.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │               SpeechEngine (trait)                 │
//! │                                                    │
//! │   wake_session(grammar) ──▶ RecognizerSession      │
//! │   command_session()     ──▶ RecognizerSession      │
//! │                                   │                │
//! │                                   ▼                │
//! │                    accept(frame) → SessionEvent    │
//! │                    Finalized(text) | Speech |      │
//! │                    Silence                         │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions are recreated for every wake attempt and every command capture,
//! so no decoder state survives between attempts.  The concrete engine is
//! [`VoskEngine`]; the listening logic that drives sessions lives in
//! [`crate::listen`].

pub mod engine;
pub mod vosk;

pub use engine::{RecognizerSession, SessionEvent, SpeechEngine, SttError};
pub use vosk::VoskEngine;

// test-only re-exports so other modules' test code can use the scripted
// doubles without reaching into stt::engine.
#[cfg(test)]
pub use engine::{ScriptedEngine, ScriptedSession};
