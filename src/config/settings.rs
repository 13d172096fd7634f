//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! The silence timeout, cache TTL/cap and speaking rate are product-tuning
//! values, so they live here rather than as constants in the components.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::language::Language;

use super::AppPaths;

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-capture state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Milliseconds of silence (no recognition updates) after which a live
    /// capture session auto-stops.
    pub silence_timeout_ms: u64,
    /// Whether the silence timer is armed at all.  When `false` the session
    /// runs until an explicit stop or the engine gives up on its own.
    pub auto_stop: bool,
    /// Number of alternatives requested from the recognizer.  The pipeline
    /// only ever reads the best one.
    pub max_alternatives: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            silence_timeout_ms: 3_000,
            auto_stop: true,
            max_alternatives: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Settings for speech synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speaking rate relative to the engine default (1.0).  Kept below 1.0 —
    /// answers are easier to follow for first-time voice users at a slower
    /// pace.
    pub rate: f32,
    /// Voice pitch (engine default 1.0).
    pub pitch: f32,
    /// Output volume (0.0 – 1.0).
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rate: 0.85,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CacheConfig
// ---------------------------------------------------------------------------

/// Settings for the answer response cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached answer stays valid.  Entries older than this are
    /// treated as absent on lookup.
    pub ttl_secs: u64,
    /// Maximum number of entries kept in the store; insertion beyond this
    /// evicts the oldest entries first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            max_entries: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// AnswerConfig
// ---------------------------------------------------------------------------

/// Settings for the remote answering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Base URL of the chat-completions gateway.
    pub base_url: String,
    /// API key — `None` for gateways that authenticate elsewhere.
    pub api_key: Option<String>,
    /// Model identifier sent to the gateway.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Upper bound on answer length in tokens.
    pub max_tokens: u32,
    /// Maximum seconds to wait for an answer before timing out.
    pub timeout_secs: u64,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ai.gateway.lovable.dev".into(),
            api_key: None,
            model: "google/gemini-3-flash-preview".into(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

/// Settings for the rolling conversation history sent with each question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum messages (user + assistant combined) kept in the window.
    pub max_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_messages: 6 }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level pipeline configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use kisaan_voice::config::VoiceConfig;
///
/// // Load (returns Default when file is missing)
/// let config = VoiceConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VoiceConfig {
    /// Active assistant language.
    pub language: Language,
    /// Speech capture settings.
    pub capture: CaptureConfig,
    /// Speech playback settings.
    pub playback: PlaybackConfig,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Remote answering service settings.
    pub answer: AnswerConfig,
    /// Conversation history window settings.
    pub history: HistoryConfig,
}

impl VoiceConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(VoiceConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `VoiceConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = VoiceConfig::default();
        original.save_to(&path).expect("save");

        let loaded = VoiceConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = VoiceConfig::load_from(&path).expect("should not error");
        assert_eq!(config, VoiceConfig::default());
    }

    /// Verify default values match the product-tuning baseline.
    #[test]
    fn default_values() {
        let cfg = VoiceConfig::default();

        assert_eq!(cfg.language, Language::English);
        assert_eq!(cfg.capture.silence_timeout_ms, 3_000);
        assert!(cfg.capture.auto_stop);
        assert_eq!(cfg.capture.max_alternatives, 1);
        assert!((cfg.playback.rate - 0.85).abs() < f32::EPSILON);
        assert!((cfg.playback.pitch - 1.0).abs() < f32::EPSILON);
        assert!((cfg.playback.volume - 1.0).abs() < f32::EPSILON);
        assert_eq!(cfg.cache.ttl_secs, 86_400);
        assert_eq!(cfg.cache.max_entries, 50);
        assert_eq!(cfg.answer.max_tokens, 1024);
        assert_eq!(cfg.answer.timeout_secs, 30);
        assert!(cfg.answer.api_key.is_none());
        assert_eq!(cfg.history.max_messages, 6);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = VoiceConfig::default();
        cfg.language = Language::Marathi;
        cfg.capture.silence_timeout_ms = 2_500;
        cfg.capture.auto_stop = false;
        cfg.playback.rate = 1.0;
        cfg.cache.ttl_secs = 3_600;
        cfg.cache.max_entries = 10;
        cfg.answer.base_url = "https://api.openai.com".into();
        cfg.answer.api_key = Some("sk-test".into());
        cfg.answer.model = "gpt-4o-mini".into();
        cfg.answer.timeout_secs = 5;
        cfg.history.max_messages = 2;

        cfg.save_to(&path).expect("save");
        let loaded = VoiceConfig::load_from(&path).expect("load");

        assert_eq!(cfg, loaded);
    }
}
