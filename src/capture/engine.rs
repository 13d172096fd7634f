//! Host speech-recognition engine contract.
//!
//! The pipeline never talks to a concrete recognizer directly.  A host
//! integration implements [`SpeechRecognizer`] + [`RecognizerFactory`] and
//! delivers [`RecognizerEvent`]s over an mpsc channel; the capture state
//! machine consumes them in delivery order.
//!
//! Capability presence is feature-detected via
//! [`RecognizerFactory::is_supported`] — an absent engine yields
//! [`CaptureError::Unsupported`], never a crash.

use thiserror::Error;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// All errors that can arise from the capture subsystem.
///
/// Raw engine error codes are mapped at this boundary; the conversational
/// controller never sees a host error object.  `Display` texts are the
/// user-facing messages surfaced by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The host provides no speech-recognition capability.  Non-retryable.
    #[error("Speech recognition is not supported on this device")]
    Unsupported,

    /// The engine heard nothing it could recognise.  Retryable.
    #[error("No speech detected. Please try again.")]
    NoSpeechDetected,

    /// No usable microphone.  Retryable after the user plugs one in.
    #[error("Microphone not found. Please check your microphone.")]
    MicrophoneUnavailable,

    /// The user has not granted microphone access.  Retryable after grant.
    #[error("Microphone permission denied. Please allow microphone access.")]
    PermissionDenied,

    /// The engine's own network path failed (many host recognizers are
    /// server-backed).  Retryable.
    #[error("Network error. Please check your connection.")]
    Network,

    /// Any engine error code this pipeline does not classify.
    #[error("Speech recognition error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Map a host engine error code to the capture taxonomy.
    ///
    /// The code strings follow the common host convention: `"no-speech"`,
    /// `"audio-capture"`, `"not-allowed"`, `"network"`.
    pub fn from_engine_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeechDetected,
            "audio-capture" => Self::MicrophoneUnavailable,
            "not-allowed" => Self::PermissionDenied,
            "network" => Self::Network,
            other => Self::Unknown(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RecognizerSettings
// ---------------------------------------------------------------------------

/// Configuration handed to the engine when a capture session starts.
///
/// Sessions are always continuous, interim-enabled and single-best: the
/// state machine relies on interim updates to keep the silence timer honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerSettings {
    /// Recognizer locale, e.g. `"hi-IN"`.
    pub locale: String,
    /// Keep listening across utterance boundaries.
    pub continuous: bool,
    /// Deliver provisional (non-final) segments.
    pub interim_results: bool,
    /// Alternatives requested per segment; only the best is read.
    pub max_alternatives: u32,
}

// ---------------------------------------------------------------------------
// RecognizerEvent
// ---------------------------------------------------------------------------

/// One recognised result segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedSegment {
    /// Best-alternative transcript text for this segment.
    pub transcript: String,
    /// `true` when the engine asserts this segment will not change further.
    pub is_final: bool,
}

impl RecognizedSegment {
    /// A segment the engine has committed to.
    pub fn final_text(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    /// A provisional segment that may still be revised.
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Events a host recognizer delivers for one session, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// The engine has actually begun listening.  The silence timer is armed
    /// only on this event, not at `start()` time — arming earlier would race
    /// a slow engine startup.
    Started,
    /// A batch of recognition updates.
    Result(Vec<RecognizedSegment>),
    /// Terminal engine error, carrying the raw engine code.
    Error(String),
    /// Engine-initiated end (e.g. its own hard silence threshold).
    Ended,
}

// ---------------------------------------------------------------------------
// SpeechRecognizer / RecognizerFactory traits
// ---------------------------------------------------------------------------

/// A live host recognizer instance bound to one capture session.
///
/// `start` is fire-and-forget: the session progresses via the event channel
/// the instance was created with.  `stop` must be safe to call from any
/// state, including after the engine has already ended on its own.
pub trait SpeechRecognizer: Send {
    /// Begin listening.
    fn start(&mut self) -> Result<(), CaptureError>;
    /// Instruct the engine to stop; a well-behaved engine follows up with
    /// [`RecognizerEvent::Ended`].
    fn stop(&mut self);
}

/// Creates recognizer instances and feature-detects the capability.
pub trait RecognizerFactory: Send + Sync {
    /// `true` when the host provides a speech-recognition engine.
    fn is_supported(&self) -> bool;

    /// Create an engine for one session, delivering its events on `events`.
    ///
    /// Fails with [`CaptureError::Unsupported`] when the capability is
    /// absent.
    fn create(
        &self,
        settings: RecognizerSettings,
        events: mpsc::Sender<RecognizerEvent>,
    ) -> Result<Box<dyn SpeechRecognizer>, CaptureError>;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

// ---------------------------------------------------------------------------
// ScriptedRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double that replays a scripted event sequence when started.
///
/// `stop()` emits [`RecognizerEvent::Ended`], mirroring a well-behaved host
/// engine — which is exactly what makes stop/engine-end finalization races
/// reproducible in tests.
#[cfg(test)]
pub struct ScriptedRecognizer {
    script: Vec<RecognizerEvent>,
    events: mpsc::Sender<RecognizerEvent>,
    end_on_stop: bool,
}

#[cfg(test)]
impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<(), CaptureError> {
        let script = std::mem::take(&mut self.script);
        let tx = self.events.clone();
        tokio::spawn(async move {
            for event in script {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(())
    }

    fn stop(&mut self) {
        if self.end_on_stop {
            let _ = self.events.try_send(RecognizerEvent::Ended);
        }
    }
}

/// Factory for [`ScriptedRecognizer`]s; every created session replays the
/// same script.
#[cfg(test)]
pub struct ScriptedRecognizerFactory {
    supported: bool,
    script: Vec<RecognizerEvent>,
    end_on_stop: bool,
    pub created: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedRecognizerFactory {
    pub fn new(script: Vec<RecognizerEvent>) -> Self {
        Self {
            supported: true,
            script,
            end_on_stop: true,
            created: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            script: Vec::new(),
            end_on_stop: true,
            created: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A factory whose engines never confirm the stop with `Ended` —
    /// simulates an engine that dies silently.
    pub fn silent_on_stop(script: Vec<RecognizerEvent>) -> Self {
        Self {
            supported: true,
            script,
            end_on_stop: false,
            created: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl RecognizerFactory for ScriptedRecognizerFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(
        &self,
        _settings: RecognizerSettings,
        events: mpsc::Sender<RecognizerEvent>,
    ) -> Result<Box<dyn SpeechRecognizer>, CaptureError> {
        if !self.supported {
            return Err(CaptureError::Unsupported);
        }
        self.created
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(Box::new(ScriptedRecognizer {
            script: self.script.clone(),
            events,
            end_on_stop: self.end_on_stop,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
