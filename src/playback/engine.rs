//! Host speech-synthesis engine contract.
//!
//! Mirrors the capture side: a host integration implements
//! [`SpeechSynthesizer`] + [`SynthesizerFactory`] and reports utterance
//! lifecycle over an mpsc channel.  The voice list may be populated
//! asynchronously — hosts announce that with
//! [`SynthesisEvent::VoicesChanged`].

use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// All errors that can arise from the playback subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host provides no speech-synthesis capability.  Non-retryable.
    #[error("Speech synthesis is not supported on this device")]
    Unsupported,

    /// The engine failed to speak an utterance.  Retryable; does not affect
    /// capture.
    #[error("Speech error: {0}")]
    Synthesis(String),
}

// ---------------------------------------------------------------------------
// Voice / Utterance
// ---------------------------------------------------------------------------

/// One synthesis voice offered by the host engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Engine-specific identifier.
    pub id: String,
    /// Human-readable voice name.
    pub name: String,
    /// Locale the voice speaks, e.g. `"hi-IN"`.
    pub locale: String,
}

impl Voice {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            locale: locale.into(),
        }
    }
}

/// One utterance handed to the engine; immutable for its session.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Target locale, also set when no matching voice was found.
    pub locale: String,
    /// Resolved voice, `None` when the engine offered no voices at all.
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

// ---------------------------------------------------------------------------
// SynthesisEvent
// ---------------------------------------------------------------------------

/// Events a host synthesizer delivers, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    /// The voice list finished (re)loading.  Engines that populate voices
    /// asynchronously send this once voices are queryable.
    VoicesChanged,
    /// The current utterance started playing.
    Started,
    /// The current utterance finished naturally.  Not sent after `cancel`.
    Ended,
    /// The current utterance failed, with an engine-provided message.
    Error(String),
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer / SynthesizerFactory traits
// ---------------------------------------------------------------------------

/// A live host synthesizer.
///
/// One engine instance serves the whole controller lifetime; utterances
/// replace each other via `cancel` + `speak`.
pub trait SpeechSynthesizer: Send {
    /// Currently available voices.  May be empty while the host is still
    /// loading its voice list.
    fn voices(&self) -> Vec<Voice>;
    /// Start speaking `utterance`.  Lifecycle is reported on the event
    /// channel the engine was created with.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), PlaybackError>;
    /// Cancel the current utterance immediately.  No `Ended` event follows.
    fn cancel(&mut self);
    /// Pause the current utterance; forwarded directly to the engine.
    fn pause(&mut self);
    /// Resume a paused utterance; forwarded directly to the engine.
    fn resume(&mut self);
}

/// Creates the synthesizer and feature-detects the capability.
pub trait SynthesizerFactory: Send + Sync {
    /// `true` when the host provides a speech-synthesis engine.
    fn is_supported(&self) -> bool;

    /// Create the engine, delivering its events on `events`.
    ///
    /// Fails with [`PlaybackError::Unsupported`] when the capability is
    /// absent.
    fn create(
        &self,
        events: mpsc::Sender<SynthesisEvent>,
    ) -> Result<Box<dyn SpeechSynthesizer>, PlaybackError>;
}

// Compile-time assertion: Box<dyn SpeechSynthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// Calls recorded by [`MockSynthesizer`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum SynthCall {
    Speak(Utterance),
    Cancel,
    Pause,
    Resume,
}

/// Test double that records every call and, when `auto_start` is set, emits
/// [`SynthesisEvent::Started`] for each accepted utterance — the shape of a
/// responsive host engine.
#[cfg(test)]
pub struct MockSynthesizer {
    voices: std::sync::Arc<std::sync::Mutex<Vec<Voice>>>,
    calls: std::sync::Arc<std::sync::Mutex<Vec<SynthCall>>>,
    events: mpsc::Sender<SynthesisEvent>,
    auto_start: bool,
}

#[cfg(test)]
impl SpeechSynthesizer for MockSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), PlaybackError> {
        self.calls
            .lock()
            .unwrap()
            .push(SynthCall::Speak(utterance.clone()));
        if self.auto_start {
            let _ = self.events.try_send(SynthesisEvent::Started);
        }
        Ok(())
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().push(SynthCall::Cancel);
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push(SynthCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.lock().unwrap().push(SynthCall::Resume);
    }
}

/// Factory for [`MockSynthesizer`]s with shared, test-inspectable state.
#[cfg(test)]
pub struct MockSynthesizerFactory {
    supported: bool,
    auto_start: bool,
    pub voices: std::sync::Arc<std::sync::Mutex<Vec<Voice>>>,
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<SynthCall>>>,
    pub events: std::sync::Mutex<Option<mpsc::Sender<SynthesisEvent>>>,
}

#[cfg(test)]
impl MockSynthesizerFactory {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self {
            supported: true,
            auto_start: true,
            voices: std::sync::Arc::new(std::sync::Mutex::new(voices)),
            calls: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
            events: std::sync::Mutex::new(None),
        }
    }

    pub fn unsupported() -> Self {
        let mut f = Self::new(Vec::new());
        f.supported = false;
        f
    }

    /// A factory whose engine never reports `Started` on its own — tests
    /// drive lifecycle events explicitly.
    pub fn manual(voices: Vec<Voice>) -> Self {
        let mut f = Self::new(voices);
        f.auto_start = false;
        f
    }

    /// Push a lifecycle event as the host engine would.
    pub fn emit(&self, event: SynthesisEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.try_send(event);
        }
    }

    /// Recorded utterance texts, in call order.
    pub fn spoken_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SynthCall::Speak(u) => Some(u.text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl SynthesizerFactory for MockSynthesizerFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(
        &self,
        events: mpsc::Sender<SynthesisEvent>,
    ) -> Result<Box<dyn SpeechSynthesizer>, PlaybackError> {
        if !self.supported {
            return Err(PlaybackError::Unsupported);
        }
        *self.events.lock().unwrap() = Some(events.clone());
        Ok(Box::new(MockSynthesizer {
            voices: std::sync::Arc::clone(&self.voices),
            calls: std::sync::Arc::clone(&self.calls),
            events,
            auto_start: self.auto_start,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_factory_fails_fast() {
        let factory = MockSynthesizerFactory::unsupported();
        assert!(!factory.is_supported());
        let (tx, _rx) = mpsc::channel(8);
        assert_eq!(factory.create(tx).err().unwrap(), PlaybackError::Unsupported);
    }

    #[tokio::test]
    async fn mock_records_calls_and_reports_start() {
        let factory =
            MockSynthesizerFactory::new(vec![Voice::new("v1", "Default", "en-IN")]);
        let (tx, mut rx) = mpsc::channel(8);
        let mut engine = factory.create(tx).unwrap();

        let utterance = Utterance {
            text: "hello".into(),
            locale: "en-IN".into(),
            voice: None,
            rate: 0.85,
            pitch: 1.0,
            volume: 1.0,
        };
        engine.speak(&utterance).unwrap();
        engine.cancel();

        assert_eq!(rx.recv().await, Some(SynthesisEvent::Started));
        let calls = factory.calls.lock().unwrap();
        assert!(matches!(calls[0], SynthCall::Speak(_)));
        assert_eq!(calls[1], SynthCall::Cancel);
    }

    #[test]
    fn synthesis_error_display_carries_message() {
        let e = PlaybackError::Synthesis("interrupted".into());
        assert!(e.to_string().contains("interrupted"));
    }
}
