//! Remote answering service module.
//!
//! This module provides:
//! * [`AnswerService`] — async trait implemented by all answering backends.
//! * [`ApiAnswerService`] — OpenAI-compatible chat-completions client.
//! * [`ConversationHistory`] / [`Message`] — rolling window of recent turns.
//! * [`AnswerError`] — error variants for answer operations.
//!
//! The backend itself is out of scope for this pipeline; it is consumed as
//! an opaque async call that may fail, rate-limit, or be slow.

pub mod history;
pub mod service;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use history::{ConversationHistory, Message, Role};
pub use service::{AnswerError, AnswerService, ApiAnswerService};
