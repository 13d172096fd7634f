//! Conversational controller — the component that ties the pipeline
//! together.
//!
//! # Architecture
//!
//! ```text
//!  UI (poll/commands)            host engines
//!        │                            │
//!  AssistantHandle          Recognizer / Synthesizer events
//!        │                            │
//!        ▼                            ▼
//!  ┌───────────────────────────────────────────┐
//!  │ VoiceAssistant — one tokio::select! loop  │
//!  │   capture machine + silence deadline      │
//!  │   response cache → answering service      │
//!  │   playback controller                     │
//!  └───────────────────────────────────────────┘
//!        │
//!        ▼
//!  SharedState (phase, transcript, answer, errors)
//! ```
//!
//! Everything is owned by one task, so commands and engine events apply in
//! arrival order and capture/playback mutual exclusion needs no locking.

pub mod runner;
pub mod state;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use runner::{AssistantCommand, AssistantHandle, VoiceAssistant};
pub use state::{new_shared_state, AssistantPhase, AssistantState, SharedState};
