//! Kisaan Voice — voice interaction pipeline for a multilingual farming
//! assistant.
//!
//! Farmers ask questions by voice and hear the answers spoken back, in
//! English, Hindi, Marathi or Kannada.  This crate provides the full
//! client-side pipeline between the host speech engines and a remote
//! answering service:
//!
//! ```text
//!  mic ──▶ capture (state machine + silence timer)
//!              │ finalized question
//!              ▼
//!          assistant ──▶ cache ──▶ answering service
//!              │ answer
//!              ▼
//!          playback (voice selection, one utterance at a time) ──▶ speaker
//! ```
//!
//! # Modules
//!
//! * [`language`] — supported languages, locales, localized apologies.
//! * [`config`] — TOML settings and platform data paths.
//! * [`capture`] — speech-to-text session state machine over a host engine.
//! * [`playback`] — text-to-speech controller with locale voice fallback.
//! * [`cache`] — bounded, time-expiring question→answer cache.
//! * [`answer`] — remote answering service client and conversation history.
//! * [`assistant`] — the event loop tying it all together.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use kisaan_voice::answer::ApiAnswerService;
//! use kisaan_voice::assistant::VoiceAssistant;
//! use kisaan_voice::cache::{FileStore, ResponseCache};
//! use kisaan_voice::config::VoiceConfig;
//!
//! # fn make_engines() -> (Arc<dyn kisaan_voice::capture::RecognizerFactory>, Box<dyn kisaan_voice::playback::SynthesizerFactory>) { unimplemented!() }
//! # async fn demo() -> anyhow::Result<()> {
//! let config = VoiceConfig::load()?;
//! let (recognizers, synthesizers) = make_engines(); // host integration
//!
//! let cache = ResponseCache::new(Box::new(FileStore::at_default_path()), &config.cache);
//! let answers = Arc::new(ApiAnswerService::from_config(&config.answer));
//!
//! let (assistant, handle) =
//!     VoiceAssistant::new(config, recognizers, synthesizers.as_ref(), answers, cache);
//! tokio::spawn(assistant.run());
//!
//! handle.start_listening().await;
//! # Ok(())
//! # }
//! ```

pub mod answer;
pub mod assistant;
pub mod cache;
pub mod capture;
pub mod config;
pub mod language;
pub mod playback;

// ── Crate-level re-exports for the common surface ──────────────────────────

pub use assistant::{AssistantHandle, AssistantPhase, VoiceAssistant};
pub use config::VoiceConfig;
pub use language::Language;
