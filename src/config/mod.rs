//! Configuration module for the voice assistant pipeline.
//!
//! Provides `VoiceConfig` (top-level settings), sub-configs for each
//! subsystem, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `VoiceConfig::load` / `VoiceConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AnswerConfig, CacheConfig, CaptureConfig, HistoryConfig, PlaybackConfig, VoiceConfig,
};
