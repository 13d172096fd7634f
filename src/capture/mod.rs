//! Speech capture module — wraps a host recognition engine in an explicit
//! state machine.
//!
//! # Architecture
//!
//! ```text
//! RecognizerFactory ──create──▶ SpeechRecognizer (host engine, black box)
//!                                     │ RecognizerEvent (mpsc)
//!                                     ▼
//!                            CaptureMachine (pure)
//!                    Idle ⇄ Listening, idempotent finalize,
//!                    TimerCmd for the driver's silence deadline
//! ```
//!
//! The machine accumulates final segments, tracks the latest interim, and
//! guarantees the finalized transcript is delivered at most once per session
//! no matter how stop, the silence timer, and the engine's own end event
//! interleave.  The async driving (timer + event loop) lives in
//! [`crate::assistant`].

pub mod engine;
pub mod machine;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{
    CaptureError, RecognizedSegment, RecognizerEvent, RecognizerFactory, RecognizerSettings,
    SpeechRecognizer,
};
pub use machine::{CaptureMachine, CaptureState, TimerCmd};

// test-only re-export so the assistant test module can script engine events
// without reaching into `capture::engine` internals.
#[cfg(test)]
pub use engine::{ScriptedRecognizer, ScriptedRecognizerFactory};
