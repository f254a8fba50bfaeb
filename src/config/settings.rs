//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! `HARK_*` environment variables override individual fields after the file
//! is read, so a systemd unit or shell profile can retarget the agent without
//! editing `settings.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Capture sample rate in Hz.  The Vosk models are trained at 16 000 Hz;
    /// the capture adapter opens the device at this rate directly.
    pub sample_rate: u32,
    /// Samples per published frame (4 000 samples = 250 ms at 16 kHz).
    pub frame_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            frame_size: 4_000,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Vosk recognizer and the listening windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// Path to the unpacked Vosk model directory.
    pub model_path: String,
    /// The phrase that wakes the agent up.
    pub wake_phrase: String,
    /// Constrained vocabulary for the wake recognizer: the wake phrase, a few
    /// command-starter words, and the `"[unk]"` fallback token.
    pub wake_grammar: Vec<String>,
    /// Seconds of detected silence after which command capture finalizes.
    pub silence_secs: u64,
    /// Hard ceiling on command capture, in seconds.
    pub max_listen_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        let model_path = AppPaths::new()
            .models_dir
            .join("vosk-model-small-en-us-0.15")
            .display()
            .to_string();
        Self {
            model_path,
            wake_phrase: "hey hark".into(),
            wake_grammar: vec![
                "hey hark".into(),
                "hark".into(),
                "note".into(),
                "remind".into(),
                "start".into(),
                "cancel".into(),
                "[unk]".into(),
            ],
            silence_secs: 1,
            max_listen_secs: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the Ollama intent-classification backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama API.
    pub base_url: String,
    /// Model identifier sent to the API (e.g. `"qwen3:8b"`).
    pub model: String,
    /// Maximum seconds to wait for a completion before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "qwen3:8b".into(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// VisionConfig
// ---------------------------------------------------------------------------

/// Settings for the optional screenshot-analysis model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Whether SCREEN commands are available at all.
    pub enabled: bool,
    /// Vision-capable model identifier (e.g. `"llava"`, `"llava:13b"`).
    pub model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "llava".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// NotesConfig
// ---------------------------------------------------------------------------

/// Settings for the Markdown daily-note vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Directory the daily `YYYY-MM-DD.md` files live in.
    pub vault_path: String,
    /// Optional filename prefix, e.g. `"inbox-"`.
    pub prefix: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        let vault_path = dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("Notes")
            .display()
            .to_string();
        Self {
            vault_path,
            prefix: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for spoken feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Whether the agent speaks confirmations out loud.
    pub enabled: bool,
    /// TTS command to spawn (e.g. `"espeak-ng"` or `"piper"`).
    pub command: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "espeak-ng".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingConfig
// ---------------------------------------------------------------------------

/// Minimum log severity, consumed by `env_logger` at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryConfig
// ---------------------------------------------------------------------------

/// Settings for the rolling conversational context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Number of past (command, action) pairs fed back into each prompt.
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use hark::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Recognizer and listening-window settings.
    pub stt: SttConfig,
    /// Ollama intent-classification settings.
    pub llm: LlmConfig,
    /// Optional screenshot-analysis settings.
    pub vision: VisionConfig,
    /// Daily-note vault settings.
    pub notes: NotesConfig,
    /// Spoken-feedback settings.
    pub tts: TtsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Rolling context window settings.
    pub memory: MemoryConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`,
    /// then apply `HARK_*` environment overrides.
    ///
    /// Returns defaults when the file does not exist yet (first-run scenario)
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).  Does **not** consult
    /// the environment.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `HARK_*` environment-variable overrides on top of whatever was
    /// loaded from disk.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HARK_MODEL_PATH") {
            self.stt.model_path = v;
        }
        if let Ok(v) = std::env::var("HARK_WAKE_PHRASE") {
            self.stt.wake_phrase = v;
        }
        if let Ok(v) = std::env::var("HARK_OLLAMA_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("HARK_OLLAMA_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("HARK_VAULT_PATH") {
            self.notes.vault_path = v;
        }
        if let Ok(v) = std::env::var("HARK_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("HARK_TTS_ENABLED") {
            self.tts.enabled = v == "true" || v == "1";
        }
        if let Ok(v) = std::env::var("HARK_VISION_ENABLED") {
            self.vision.enabled = v == "true" || v == "1";
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.audio.sample_rate, loaded.audio.sample_rate);
        assert_eq!(original.audio.frame_size, loaded.audio.frame_size);
        assert_eq!(original.stt.wake_phrase, loaded.stt.wake_phrase);
        assert_eq!(original.stt.wake_grammar, loaded.stt.wake_grammar);
        assert_eq!(original.stt.silence_secs, loaded.stt.silence_secs);
        assert_eq!(original.stt.max_listen_secs, loaded.stt.max_listen_secs);
        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);
        assert_eq!(original.vision.enabled, loaded.vision.enabled);
        assert_eq!(original.notes.vault_path, loaded.notes.vault_path);
        assert_eq!(original.tts.command, loaded.tts.command);
        assert_eq!(original.logging.level, loaded.logging.level);
        assert_eq!(original.memory.capacity, loaded.memory.capacity);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.stt.wake_phrase, default.stt.wake_phrase);
        assert_eq!(config.llm.model, default.llm.model);
        assert_eq!(config.audio.sample_rate, default.audio.sample_rate);
    }

    /// Verify default values match the design.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert_eq!(cfg.audio.frame_size, 4_000);
        assert_eq!(cfg.stt.wake_phrase, "hey hark");
        assert!(cfg.stt.wake_grammar.contains(&"[unk]".to_string()));
        assert_eq!(cfg.stt.silence_secs, 1);
        assert_eq!(cfg.stt.max_listen_secs, 7);
        assert_eq!(cfg.llm.base_url, "http://localhost:11434");
        assert_eq!(cfg.llm.timeout_secs, 60);
        assert!(!cfg.vision.enabled);
        assert!(!cfg.tts.enabled);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.memory.capacity, 10);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.stt.wake_phrase = "hey computer".into();
        cfg.stt.max_listen_secs = 12;
        cfg.llm.base_url = "http://ollama.lan:11434".into();
        cfg.llm.model = "mistral:7b".into();
        cfg.vision.enabled = true;
        cfg.vision.model = "llava:13b".into();
        cfg.notes.prefix = "inbox-".into();
        cfg.memory.capacity = 4;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.stt.wake_phrase, "hey computer");
        assert_eq!(loaded.stt.max_listen_secs, 12);
        assert_eq!(loaded.llm.base_url, "http://ollama.lan:11434");
        assert_eq!(loaded.llm.model, "mistral:7b");
        assert!(loaded.vision.enabled);
        assert_eq!(loaded.vision.model, "llava:13b");
        assert_eq!(loaded.notes.prefix, "inbox-");
        assert_eq!(loaded.memory.capacity, 4);
    }

    /// Environment overrides take precedence over loaded values.
    #[test]
    fn env_override_applies() {
        let mut cfg = AppConfig::default();
        std::env::set_var("HARK_WAKE_PHRASE", "hey override");
        cfg.apply_env_overrides();
        std::env::remove_var("HARK_WAKE_PHRASE");

        assert_eq!(cfg.stt.wake_phrase, "hey override");
    }
}
