//! Language-model client module.
//!
//! Provides:
//! * [`LanguageModel`] — async text-generation trait (intent classification).
//! * [`VisionModel`] — async generation with base64 image attachments.
//! * [`OllamaClient`] — concrete client for Ollama's `/api/generate`.
//! * [`LlmError`] — error variants for model calls.

pub mod client;

pub use client::{LanguageModel, LlmError, OllamaClient, VisionModel};
