//! Assistant phase machine and shared snapshot state.
//!
//! [`AssistantPhase`] tracks which half of the voice turn is active.  The UI
//! reads it via [`SharedState`] to render the mic/speaker widgets.
//!
//! [`AssistantState`] is the single source of truth for everything the UI
//! needs: current phase, live transcript, last question/answer, per-side
//! errors, and the active language.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AssistantState>>` — cheap
//! to clone and safe to share across threads.

use std::sync::{Arc, Mutex};

use crate::capture::CaptureError;
use crate::language::Language;
use crate::playback::PlaybackError;

// ---------------------------------------------------------------------------
// AssistantPhase
// ---------------------------------------------------------------------------

/// Phases of one voice interaction turn.
///
/// The phase transitions are:
///
/// ```text
/// Idle ──startListening──▶ Listening
///        ──transcript finalized──▶ Thinking  (cache lookup / remote answer)
///                                  ──answer speaking──▶ Speaking
/// Speaking ──playback end──▶ Idle
/// any phase ──error──▶ Idle  (error recorded in AssistantState)
/// ```
///
/// Capture and playback are mutually exclusive by policy, so a single phase
/// describes the whole pipeline: the microphone is live only in `Listening`
/// and the speaker only in `Speaking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistantPhase {
    /// Waiting for the user to tap the mic.
    #[default]
    Idle,

    /// A capture session is live; the transcript is growing.
    Listening,

    /// Transcript finalized; looking up the cache or awaiting the remote
    /// answering service.
    Thinking,

    /// The answer is being spoken.
    Speaking,
}

impl AssistantPhase {
    /// Returns `true` while the pipeline is actively capturing, answering
    /// or speaking.
    ///
    /// The UI uses this to swap the mic button for a busy indicator.
    pub fn is_busy(&self) -> bool {
        !matches!(self, AssistantPhase::Idle)
    }

    /// A short human-readable label suitable for the UI status line.
    pub fn label(&self) -> &'static str {
        match self {
            AssistantPhase::Idle => "Idle",
            AssistantPhase::Listening => "Listening",
            AssistantPhase::Thinking => "Thinking",
            AssistantPhase::Speaking => "Speaking",
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantState
// ---------------------------------------------------------------------------

/// Shared assistant state — the single source of truth for the UI.
///
/// Held behind [`SharedState`].  The assistant event loop mutates it; the
/// UI reads it each frame.
#[derive(Debug)]
pub struct AssistantState {
    /// Current phase of the voice turn.
    pub phase: AssistantPhase,

    /// Live transcript while listening; the finalized question afterwards.
    pub transcript: String,

    /// The most recent finalized question.
    pub last_question: Option<String>,

    /// The most recent answer handed to playback (cached, remote, or the
    /// localized apology).
    pub last_answer: Option<String>,

    /// Last capture-side error, cleared when a new session starts.
    pub capture_error: Option<CaptureError>,

    /// Last playback-side error, cleared when a new utterance starts.
    pub playback_error: Option<PlaybackError>,

    /// Active assistant language.
    pub language: Language,
}

impl AssistantState {
    pub fn new(language: Language) -> Self {
        Self {
            phase: AssistantPhase::Idle,
            transcript: String::new(),
            last_question: None,
            last_answer: None,
            capture_error: None,
            playback_error: None,
            language,
        }
    }
}

impl Default for AssistantState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AssistantState`].
///
/// Cheap to clone (`Arc` clone).  Lock for a short critical section; do
/// **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AssistantState>>;

/// Construct a new [`SharedState`] for `language`.
pub fn new_shared_state(language: Language) -> SharedState {
    Arc::new(Mutex::new(AssistantState::new(language)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
