//! Speech playback module — wraps a host synthesis engine behind a small
//! state machine with voice selection.
//!
//! # Architecture
//!
//! ```text
//! SynthesizerFactory ──create──▶ SpeechSynthesizer (host engine, black box)
//!                                      │ SynthesisEvent (mpsc)
//!                                      ▼
//!                          PlaybackController
//!               Idle ⇄ Speaking ⇄ Paused, cancel-before-speak,
//!               exact → prefix → first voice fallback
//! ```

pub mod controller;
pub mod engine;
pub mod voice;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use controller::{PlaybackController, PlaybackState};
pub use engine::{
    PlaybackError, SpeechSynthesizer, SynthesisEvent, SynthesizerFactory, Utterance, Voice,
};
pub use voice::select_voice;

// test-only re-export for the assistant test module.
#[cfg(test)]
pub use engine::{MockSynthesizerFactory, SynthCall};
