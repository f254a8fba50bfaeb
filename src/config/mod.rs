//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save_to`.  `HARK_*` environment variables
//! override individual fields after the file is read.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, AudioConfig, LlmConfig, LoggingConfig, MemoryConfig, NotesConfig, SttConfig,
    TtsConfig, VisionConfig,
};
