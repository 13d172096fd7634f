//! Capture state machine — one listening episode as an explicit state enum.
//!
//! The state machine transitions are:
//!
//! ```text
//! Idle ──start()──▶ Listening
//!                   ──engine Started──▶ (arm silence timer)
//!                   ──Result update──▶ (accumulate, rearm timer)
//!                   ──finalize()──▶ Idle   (stop / timer fire / engine end)
//!                   ──on_error()──▶ Idle   (no transcript delivered)
//! ```
//!
//! The machine is deliberately pure: it owns no engine handle and no timer.
//! Each transition reports a [`TimerCmd`] so the driver arms and disarms the
//! silence deadline in exactly one place, and [`finalize`] is the single
//! idempotent exit path shared by explicit stop, timer fire and
//! engine-initiated end — the `has_emitted_result` guard is what keeps a
//! transcript from ever being delivered twice when those race.
//!
//! [`finalize`]: CaptureMachine::finalize

use super::engine::{CaptureError, RecognizedSegment};

// ---------------------------------------------------------------------------
// CaptureState
// ---------------------------------------------------------------------------

/// Externally visible states of a capture session.
///
/// Terminal transitions always return to `Idle`; there are no nested states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No session live; safe to start a new one.
    #[default]
    Idle,
    /// Engine created and listening (or about to be).
    Listening,
}

// ---------------------------------------------------------------------------
// TimerCmd
// ---------------------------------------------------------------------------

/// What the driver should do with the silence deadline after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCmd {
    /// Schedule the deadline `silence_timeout` from now.
    Arm,
    /// Cancel and reschedule — any new speech activity resets the countdown.
    Rearm,
    /// Cancel the deadline; the session is over.
    Disarm,
    /// Leave the deadline alone.
    Keep,
}

// ---------------------------------------------------------------------------
// CaptureMachine
// ---------------------------------------------------------------------------

/// State for one listening episode.
///
/// Final segments are appended (space-separated) to the accumulated
/// transcript in arrival order; the engine re-emits growing partial text, so
/// interim segments *replace* the previous interim rather than concatenate.
#[derive(Debug, Default)]
pub struct CaptureMachine {
    state: CaptureState,
    accumulated_final: String,
    live_interim: String,
    has_emitted_result: bool,
}

impl CaptureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// `true` while a session is live.
    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    /// The externally visible transcript so far: accumulated finals plus the
    /// latest interim, trimmed.
    pub fn current_transcript(&self) -> String {
        let mut text = self.accumulated_final.clone();
        if !self.live_interim.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.live_interim);
        }
        text.trim().to_string()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Begin a new session: reset all per-session state and enter Listening.
    ///
    /// The silence timer is *not* armed here — only once the engine confirms
    /// startup via [`on_engine_started`](Self::on_engine_started).
    pub fn start(&mut self) {
        self.state = CaptureState::Listening;
        self.accumulated_final.clear();
        self.live_interim.clear();
        self.has_emitted_result = false;
    }

    /// The engine confirmed it is listening; the countdown can begin.
    pub fn on_engine_started(&mut self) -> TimerCmd {
        match self.state {
            CaptureState::Listening => TimerCmd::Arm,
            CaptureState::Idle => TimerCmd::Keep,
        }
    }

    /// Apply one batch of recognition updates.
    ///
    /// Every update, final or interim, rearms the silence timer — any speech
    /// activity resets the countdown.
    pub fn on_result(&mut self, segments: &[RecognizedSegment]) -> TimerCmd {
        if self.state != CaptureState::Listening {
            return TimerCmd::Keep;
        }

        for segment in segments {
            if segment.is_final {
                if !self.accumulated_final.is_empty() {
                    self.accumulated_final.push(' ');
                }
                self.accumulated_final.push_str(&segment.transcript);
                self.live_interim.clear();
            } else {
                self.live_interim = segment.transcript.clone();
            }
        }

        TimerCmd::Rearm
    }

    /// Terminal engine error: map the code, return to Idle, never deliver a
    /// transcript for this session.
    pub fn on_error(&mut self, code: &str) -> (CaptureError, TimerCmd) {
        self.state = CaptureState::Idle;
        // Suppress any later finalization attempt for this session.
        self.has_emitted_result = true;
        (CaptureError::from_engine_code(code), TimerCmd::Disarm)
    }

    /// End the session and emit the finalized transcript at most once.
    ///
    /// Shared by every end-of-session path (caller stop, silence timer,
    /// engine-initiated end).  Returns `Some(transcript)` exactly once per
    /// session, and only when any speech — final or interim — was
    /// accumulated; the returned transcript is trimmed and non-empty.
    pub fn finalize(&mut self) -> Option<String> {
        self.state = CaptureState::Idle;

        if self.has_emitted_result {
            return None;
        }
        self.has_emitted_result = true;

        let transcript = self.current_transcript();
        if transcript.is_empty() {
            None
        } else {
            Some(transcript)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn started_machine() -> CaptureMachine {
        let mut m = CaptureMachine::new();
        m.start();
        assert_eq!(m.on_engine_started(), TimerCmd::Arm);
        m
    }

    // ---- accumulation semantics ----

    #[test]
    fn final_segments_append_in_arrival_order() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("when to")]);
        m.on_result(&[RecognizedSegment::final_text("sow wheat")]);
        assert_eq!(m.current_transcript(), "when to sow wheat");
    }

    #[test]
    fn interim_replaces_rather_than_concatenates() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::interim("wh")]);
        m.on_result(&[RecognizedSegment::interim("when to")]);
        m.on_result(&[RecognizedSegment::interim("when to sow")]);
        // Only the latest interim counts.
        assert_eq!(m.current_transcript(), "when to sow");
    }

    #[test]
    fn transcript_is_final_plus_latest_interim_trimmed() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text(" when to sow ")]);
        m.on_result(&[RecognizedSegment::interim("wheat")]);
        assert_eq!(m.current_transcript(), "when to sow  wheat");

        // A final arriving clears the interim it supersedes.
        m.on_result(&[RecognizedSegment::final_text("wheat this year")]);
        assert_eq!(
            m.current_transcript(),
            "when to sow  wheat this year"
        );
    }

    #[test]
    fn mixed_batch_applies_segments_in_order() {
        let mut m = started_machine();
        m.on_result(&[
            RecognizedSegment::final_text("pest on"),
            RecognizedSegment::interim("cotton le"),
        ]);
        assert_eq!(m.current_transcript(), "pest on cotton le");
    }

    // ---- timer commands ----

    #[test]
    fn timer_arms_only_on_engine_started() {
        let mut m = CaptureMachine::new();
        m.start();
        // Nothing to arm before the engine confirms startup.
        assert_eq!(m.on_engine_started(), TimerCmd::Arm);
    }

    #[test]
    fn every_update_rearms_the_timer() {
        let mut m = started_machine();
        assert_eq!(
            m.on_result(&[RecognizedSegment::interim("a")]),
            TimerCmd::Rearm
        );
        assert_eq!(
            m.on_result(&[RecognizedSegment::final_text("b")]),
            TimerCmd::Rearm
        );
    }

    #[test]
    fn error_disarms_the_timer() {
        let mut m = started_machine();
        let (_, cmd) = m.on_error("network");
        assert_eq!(cmd, TimerCmd::Disarm);
    }

    #[test]
    fn stale_events_after_session_end_are_ignored() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("done")]);
        m.finalize();
        assert_eq!(
            m.on_result(&[RecognizedSegment::final_text("stray")]),
            TimerCmd::Keep
        );
        assert_eq!(m.on_engine_started(), TimerCmd::Keep);
    }

    // ---- at-most-once finalization ----

    #[test]
    fn finalize_emits_exactly_once() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("rain forecast")]);

        // Timer fires…
        assert_eq!(m.finalize().as_deref(), Some("rain forecast"));
        // …then the engine's own end event races in.
        assert_eq!(m.finalize(), None);
        // …and a late caller stop changes nothing either.
        assert_eq!(m.finalize(), None);
    }

    #[test]
    fn error_then_engine_end_delivers_nothing() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("half a question")]);
        let (err, _) = m.on_error("not-allowed");
        assert_eq!(err, CaptureError::PermissionDenied);
        // The engine-end that typically follows an error must not deliver
        // the partial transcript.
        assert_eq!(m.finalize(), None);
    }

    // ---- at-least-once-if-nonempty ----

    #[test]
    fn interim_only_session_still_delivers() {
        let mut m = started_machine();
        // Engine died before marking anything final.
        m.on_result(&[RecognizedSegment::interim("kapas par keede")]);
        assert_eq!(m.finalize().as_deref(), Some("kapas par keede"));
    }

    #[test]
    fn empty_session_delivers_nothing() {
        let mut m = started_machine();
        assert_eq!(m.finalize(), None);
    }

    #[test]
    fn whitespace_only_speech_counts_as_empty() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::interim("   ")]);
        assert_eq!(m.finalize(), None);
    }

    #[test]
    fn delivered_transcript_is_trimmed() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("  when to sow wheat  ")]);
        assert_eq!(m.finalize().as_deref(), Some("when to sow wheat"));
    }

    // ---- session reuse ----

    #[test]
    fn restart_resets_all_session_state() {
        let mut m = started_machine();
        m.on_result(&[RecognizedSegment::final_text("first question")]);
        assert!(m.finalize().is_some());

        m.start();
        assert!(m.is_listening());
        assert_eq!(m.current_transcript(), "");
        m.on_result(&[RecognizedSegment::final_text("second question")]);
        assert_eq!(m.finalize().as_deref(), Some("second question"));
    }

    #[test]
    fn default_state_is_idle() {
        let m = CaptureMachine::new();
        assert_eq!(m.state(), CaptureState::Idle);
        assert!(!m.is_listening());
    }
}
