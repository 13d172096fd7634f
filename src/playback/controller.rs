//! Playback controller — one audible utterance at a time.
//!
//! The state machine transitions are:
//!
//! ```text
//! Idle ──speak() + engine Started──▶ Speaking
//!      Speaking ──Ended / Error──▶ Idle
//!      Speaking ──pause()──▶ Paused ──resume()──▶ Speaking
//!      any state ──stop()──▶ Idle   (no end event fires)
//! ```
//!
//! `speak` always cancels the in-flight utterance first, so two utterances
//! are never audible at once.  When the engine's voice list is still
//! loading, the utterance is parked and retried on the `VoicesChanged`
//! event.

use crate::config::PlaybackConfig;
use crate::language::Language;

use super::engine::{PlaybackError, SpeechSynthesizer, SynthesisEvent, Utterance};
use super::voice::select_voice;

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// States of the playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing audible.
    #[default]
    Idle,
    /// An utterance is playing (between the engine's start and end events).
    Speaking,
    /// The engine reports the utterance paused.
    Paused,
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

/// Drives a host synthesizer with voice selection and cancel-before-speak.
///
/// `engine` is `None` when the host lacks the synthesis capability; every
/// `speak` then fails with [`PlaybackError::Unsupported`] and playback
/// errors never leak into capture.
pub struct PlaybackController {
    engine: Option<Box<dyn SpeechSynthesizer>>,
    config: PlaybackConfig,
    state: PlaybackState,
    /// Utterance parked until the engine reports its voices are ready.
    pending: Option<(String, Language)>,
}

impl PlaybackController {
    pub fn new(engine: Option<Box<dyn SpeechSynthesizer>>, config: PlaybackConfig) -> Self {
        Self {
            engine,
            config,
            state: PlaybackState::Idle,
            pending: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// `true` between an utterance's start and its end/error.
    pub fn is_speaking(&self) -> bool {
        self.state == PlaybackState::Speaking
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Speak `text` in `language`, replacing any in-flight utterance.
    ///
    /// The prior utterance is cancelled *before* the new one is handed to
    /// the engine.  The cancel is unconditional: the engine may hold an
    /// utterance that was submitted but has not reported `Started` yet,
    /// which the controller's state cannot see.  If the engine has not
    /// loaded its voice list yet the utterance is parked; it will be
    /// spoken when [`SynthesisEvent::VoicesChanged`] arrives.
    pub fn speak(&mut self, text: &str, language: Language) -> Result<(), PlaybackError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(PlaybackError::Unsupported);
        };

        engine.cancel();
        self.pending = None;
        self.state = PlaybackState::Idle;

        let voices = engine.voices();
        if voices.is_empty() {
            log::debug!("playback: voice list not ready, parking utterance");
            self.pending = Some((text.to_string(), language));
            return Ok(());
        }

        let locale = language.locale();
        let voice = select_voice(&voices, locale).cloned();
        if voice.is_none() {
            log::warn!("playback: no voice available for {locale}");
        }

        let utterance = Utterance {
            text: text.to_string(),
            locale: locale.to_string(),
            voice,
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
        };

        engine.speak(&utterance)
    }

    /// Cancel playback immediately.  No end event fires for the cancelled
    /// utterance.  Safe to call from any state, including Idle.
    pub fn stop(&mut self) {
        self.pending = None;
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel();
        }
        self.state = PlaybackState::Idle;
    }

    /// Forwarded to the engine; tracked as Paused while an utterance is live.
    pub fn pause(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.pause();
            if self.state == PlaybackState::Speaking {
                self.state = PlaybackState::Paused;
            }
        }
    }

    /// Forwarded to the engine.
    pub fn resume(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.resume();
            if self.state == PlaybackState::Paused {
                self.state = PlaybackState::Speaking;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Engine events
    // -----------------------------------------------------------------------

    /// Apply one engine lifecycle event.
    ///
    /// Returns the playback error to surface, if any.  Every error path
    /// returns the controller to Idle so the next `speak` can retry.
    pub fn on_event(&mut self, event: SynthesisEvent) -> Option<PlaybackError> {
        match event {
            SynthesisEvent::VoicesChanged => {
                if let Some((text, language)) = self.pending.take() {
                    log::debug!("playback: voices ready, speaking parked utterance");
                    if let Err(e) = self.speak(&text, language) {
                        return Some(e);
                    }
                }
                None
            }
            SynthesisEvent::Started => {
                self.state = PlaybackState::Speaking;
                None
            }
            SynthesisEvent::Ended => {
                self.state = PlaybackState::Idle;
                None
            }
            SynthesisEvent::Error(message) => {
                self.state = PlaybackState::Idle;
                log::warn!("playback: synthesis error: {message}");
                Some(PlaybackError::Synthesis(message))
            }
        }
    }
}

impl Drop for PlaybackController {
    /// Teardown cancels any live utterance so audio never outlives the
    /// owning context.
    fn drop(&mut self) {
        if self.state != PlaybackState::Idle {
            if let Some(engine) = self.engine.as_mut() {
                engine.cancel();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
