//! Conversational event loop — drives capture, answering and playback.
//!
//! # Architecture
//!
//! ```text
//! AssistantHandle ──AssistantCommand──▶ ┌──────────────────────────┐
//!                                       │      VoiceAssistant      │
//! SpeechRecognizer ──RecognizerEvent──▶ │  single tokio::select!   │
//! SpeechSynthesizer ──SynthesisEvent──▶ │  loop, silence deadline  │
//!                                       └────────────┬─────────────┘
//!                                                    ▼
//!            CaptureMachine · ResponseCache · AnswerService
//!                          · PlaybackController
//! ```
//!
//! One task owns every component; commands and engine events are applied in
//! arrival order, so no two transitions ever interleave.  The silence
//! deadline is a plain `Option<Instant>` in the loop — armed, rearmed and
//! disarmed exactly where the capture machine's [`TimerCmd`] says to.
//!
//! A finalized transcript flows: stop the assistant's own voice, consult the
//! cache, fall back to the remote answering service, speak the result.
//! Service failures are spoken as a localized apology and never cached.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::answer::{AnswerService, ConversationHistory};
use crate::capture::{
    CaptureError, CaptureMachine, RecognizerEvent, RecognizerFactory, RecognizerSettings,
    SpeechRecognizer, TimerCmd,
};
use crate::cache::ResponseCache;
use crate::config::VoiceConfig;
use crate::language::Language;
use crate::playback::{
    PlaybackController, PlaybackError, SynthesisEvent, SynthesizerFactory,
};

use super::state::{new_shared_state, AssistantPhase, SharedState};

// ---------------------------------------------------------------------------
// AssistantCommand / AssistantHandle
// ---------------------------------------------------------------------------

/// Commands the UI sends to the assistant event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantCommand {
    /// Open a capture session (stops playback first).
    StartListening,
    /// End the capture session and answer whatever was heard.
    StopListening,
    /// Speak arbitrary text (stops any capture session first).
    Speak(String),
    /// Cancel playback immediately.
    StopSpeaking,
    /// Pause the current utterance.
    PausePlayback,
    /// Resume a paused utterance.
    ResumePlayback,
    /// Switch the assistant language; clears conversation history.
    SetLanguage(Language),
}

/// Cloneable handle for talking to a running [`VoiceAssistant`].
///
/// Commands are fire-and-forget; results show up in the shared state
/// snapshot.  When the event loop is gone, commands are dropped with a
/// warning instead of failing the caller.
#[derive(Clone)]
pub struct AssistantHandle {
    commands: mpsc::Sender<AssistantCommand>,
    state: SharedState,
}

impl AssistantHandle {
    pub async fn start_listening(&self) {
        self.send(AssistantCommand::StartListening).await;
    }

    pub async fn stop_listening(&self) {
        self.send(AssistantCommand::StopListening).await;
    }

    pub async fn speak(&self, text: impl Into<String>) {
        self.send(AssistantCommand::Speak(text.into())).await;
    }

    pub async fn stop_speaking(&self) {
        self.send(AssistantCommand::StopSpeaking).await;
    }

    pub async fn pause_playback(&self) {
        self.send(AssistantCommand::PausePlayback).await;
    }

    pub async fn resume_playback(&self) {
        self.send(AssistantCommand::ResumePlayback).await;
    }

    pub async fn set_language(&self, language: Language) {
        self.send(AssistantCommand::SetLanguage(language)).await;
    }

    async fn send(&self, command: AssistantCommand) {
        if self.commands.send(command).await.is_err() {
            log::warn!("assistant: command dropped, event loop is gone");
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot readers
    // -----------------------------------------------------------------------

    /// Clone of the shared state handle, for UIs that poll every frame.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    pub fn phase(&self) -> AssistantPhase {
        self.state.lock().unwrap().phase
    }

    pub fn is_listening(&self) -> bool {
        self.phase() == AssistantPhase::Listening
    }

    pub fn is_speaking(&self) -> bool {
        self.phase() == AssistantPhase::Speaking
    }

    /// Live transcript while listening; the finalized question afterwards.
    pub fn current_transcript(&self) -> String {
        self.state.lock().unwrap().transcript.clone()
    }

    pub fn last_answer(&self) -> Option<String> {
        self.state.lock().unwrap().last_answer.clone()
    }

    pub fn capture_error(&self) -> Option<CaptureError> {
        self.state.lock().unwrap().capture_error.clone()
    }

    pub fn playback_error(&self) -> Option<PlaybackError> {
        self.state.lock().unwrap().playback_error.clone()
    }
}

// ---------------------------------------------------------------------------
// VoiceAssistant
// ---------------------------------------------------------------------------

/// One live capture session: the engine instance plus its event channel.
/// Dropping it releases the engine; stray events after that are discarded
/// with the receiver.
struct CaptureSession {
    engine: Box<dyn SpeechRecognizer>,
    events: mpsc::Receiver<RecognizerEvent>,
}

/// The assistant event loop.  Construct with [`VoiceAssistant::new`], then
/// `tokio::spawn(assistant.run())` and keep the returned
/// [`AssistantHandle`].
pub struct VoiceAssistant {
    config: VoiceConfig,
    language: Language,
    state: SharedState,

    commands: mpsc::Receiver<AssistantCommand>,

    recognizers: Arc<dyn RecognizerFactory>,
    capture: CaptureMachine,
    session: Option<CaptureSession>,
    /// Silence deadline; `None` while disarmed.
    deadline: Option<Instant>,

    playback: PlaybackController,
    synth_events: mpsc::Receiver<SynthesisEvent>,

    cache: ResponseCache,
    answers: Arc<dyn AnswerService>,
    history: ConversationHistory,
}

impl VoiceAssistant {
    /// Wire up the assistant from its parts.
    ///
    /// The synthesizer is created once here (it serves the whole assistant
    /// lifetime); recognizer instances are created per capture session.  An
    /// unsupported synthesizer is tolerated — every later `speak` surfaces
    /// [`PlaybackError::Unsupported`] in the shared state instead.
    pub fn new(
        config: VoiceConfig,
        recognizers: Arc<dyn RecognizerFactory>,
        synthesizers: &dyn SynthesizerFactory,
        answers: Arc<dyn AnswerService>,
        cache: ResponseCache,
    ) -> (Self, AssistantHandle) {
        let state = new_shared_state(config.language);
        let (command_tx, command_rx) = mpsc::channel(16);
        let (synth_tx, synth_rx) = mpsc::channel(32);

        let engine = match synthesizers.create(synth_tx) {
            Ok(engine) => Some(engine),
            Err(e) => {
                log::warn!("assistant: no speech synthesis: {e}");
                None
            }
        };

        let handle = AssistantHandle {
            commands: command_tx,
            state: Arc::clone(&state),
        };

        let assistant = Self {
            language: config.language,
            playback: PlaybackController::new(engine, config.playback.clone()),
            history: ConversationHistory::new(config.history.max_messages),
            config,
            state,
            commands: command_rx,
            recognizers,
            capture: CaptureMachine::new(),
            session: None,
            deadline: None,
            synth_events: synth_rx,
            cache,
            answers,
        };

        (assistant, handle)
    }

    /// Run the event loop until every [`AssistantHandle`] is dropped.
    pub async fn run(mut self) {
        log::info!("assistant: event loop started");
        loop {
            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => LoopEvent::Command(command),
                    None => break,
                },
                event = next_recognizer_event(&mut self.session) => {
                    LoopEvent::Recognizer(event)
                }
                event = next_synthesis_event(&mut self.synth_events) => {
                    LoopEvent::Synthesis(event)
                }
                _ = silence_deadline(self.deadline) => LoopEvent::SilenceElapsed,
            };

            match event {
                LoopEvent::Command(command) => self.handle_command(command).await,
                LoopEvent::Recognizer(event) => self.handle_recognizer_event(event).await,
                LoopEvent::Synthesis(event) => self.handle_synthesis_event(event),
                LoopEvent::SilenceElapsed => {
                    log::debug!("assistant: silence timeout elapsed");
                    self.finish_capture().await;
                }
            }
        }
        self.teardown();
        log::info!("assistant: event loop stopped");
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    async fn handle_command(&mut self, command: AssistantCommand) {
        match command {
            AssistantCommand::StartListening => self.start_listening(),
            AssistantCommand::StopListening => self.finish_capture().await,
            AssistantCommand::Speak(text) => {
                // Mutual exclusion: a live capture session ends (and its
                // transcript is answered) before the requested text plays.
                self.finish_capture().await;
                self.speak_text(text);
            }
            AssistantCommand::StopSpeaking => self.stop_speaking(),
            AssistantCommand::PausePlayback => self.playback.pause(),
            AssistantCommand::ResumePlayback => self.playback.resume(),
            AssistantCommand::SetLanguage(language) => self.set_language(language),
        }
    }

    fn start_listening(&mut self) {
        if self.capture.is_listening() {
            log::debug!("assistant: already listening");
            return;
        }

        // Mutual exclusion: the assistant must not talk over the user.
        self.playback.stop();

        {
            let mut st = self.state.lock().unwrap();
            st.capture_error = None;
            st.transcript.clear();
            st.phase = AssistantPhase::Idle;
        }

        if !self.recognizers.is_supported() {
            log::warn!("assistant: speech recognition unavailable on this host");
            self.state.lock().unwrap().capture_error = Some(CaptureError::Unsupported);
            return;
        }

        let settings = RecognizerSettings {
            locale: self.language.locale().to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: self.config.capture.max_alternatives,
        };
        let (event_tx, event_rx) = mpsc::channel(32);
        let mut engine = match self.recognizers.create(settings, event_tx) {
            Ok(engine) => engine,
            Err(e) => {
                log::warn!("assistant: recognizer creation failed: {e}");
                self.state.lock().unwrap().capture_error = Some(e);
                return;
            }
        };

        self.capture.start();
        if let Err(e) = engine.start() {
            log::warn!("assistant: recognizer failed to start: {e}");
            let _ = self.capture.finalize();
            self.state.lock().unwrap().capture_error = Some(e);
            return;
        }

        self.session = Some(CaptureSession {
            engine,
            events: event_rx,
        });
        log::debug!("assistant: listening ({})", self.language.locale());
    }

    fn stop_speaking(&mut self) {
        self.playback.stop();
        let mut st = self.state.lock().unwrap();
        if matches!(
            st.phase,
            AssistantPhase::Speaking | AssistantPhase::Thinking
        ) {
            st.phase = AssistantPhase::Idle;
        }
    }

    fn set_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        log::info!("assistant: language switched to {}", language.name());
        self.language = language;
        // Mixed-language context confuses the answering model more than no
        // context at all.
        self.history.clear();
        self.state.lock().unwrap().language = language;
    }

    // -----------------------------------------------------------------------
    // Capture events
    // -----------------------------------------------------------------------

    async fn handle_recognizer_event(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Started => {
                let cmd = self.capture.on_engine_started();
                self.apply_timer(cmd);
                if self.capture.is_listening() {
                    self.state.lock().unwrap().phase = AssistantPhase::Listening;
                }
            }
            RecognizerEvent::Result(segments) => {
                let cmd = self.capture.on_result(&segments);
                self.apply_timer(cmd);
                if self.capture.is_listening() {
                    self.state.lock().unwrap().transcript = self.capture.current_transcript();
                }
            }
            RecognizerEvent::Error(code) => {
                let (error, cmd) = self.capture.on_error(&code);
                self.apply_timer(cmd);
                log::warn!("assistant: capture error: {error}");
                self.session = None;
                let mut st = self.state.lock().unwrap();
                st.capture_error = Some(error);
                st.phase = AssistantPhase::Idle;
            }
            RecognizerEvent::Ended => {
                log::debug!("assistant: engine ended the session");
                self.finish_capture().await;
            }
        }
    }

    /// End the capture session (if any) and route the finalized transcript
    /// into the answering flow.
    ///
    /// Shared by explicit stop, the silence timer, the engine's own end
    /// event, and a `Speak` pre-emption — [`CaptureMachine::finalize`] keeps
    /// delivery at-most-once no matter how those race.
    async fn finish_capture(&mut self) {
        self.deadline = None;
        if let Some(mut session) = self.session.take() {
            session.engine.stop();
        }
        match self.capture.finalize() {
            Some(question) => self.handle_question(question).await,
            None => {
                let mut st = self.state.lock().unwrap();
                if st.phase == AssistantPhase::Listening {
                    st.phase = AssistantPhase::Idle;
                }
            }
        }
    }

    fn apply_timer(&mut self, cmd: TimerCmd) {
        match cmd {
            TimerCmd::Arm | TimerCmd::Rearm => {
                if self.config.capture.auto_stop {
                    let timeout = Duration::from_millis(self.config.capture.silence_timeout_ms);
                    self.deadline = Some(Instant::now() + timeout);
                }
            }
            TimerCmd::Disarm => self.deadline = None,
            TimerCmd::Keep => {}
        }
    }

    // -----------------------------------------------------------------------
    // Answering
    // -----------------------------------------------------------------------

    /// Answer one finalized question: cache first, remote service on a miss,
    /// localized apology on failure.  Failures are never cached.
    async fn handle_question(&mut self, question: String) {
        log::info!("assistant: question finalized ({} chars)", question.len());

        // The assistant's own voice yields to the new question.
        self.playback.stop();
        {
            let mut st = self.state.lock().unwrap();
            st.phase = AssistantPhase::Thinking;
            st.transcript = question.clone();
            st.last_question = Some(question.clone());
        }

        if let Some(answer) = self.cache.get(self.language, &question) {
            log::debug!("assistant: cache hit");
            self.history.push_user(question);
            self.history.push_assistant(answer.as_str());
            self.speak_text(answer);
            return;
        }

        let result = self
            .answers
            .answer(&question, self.language, &self.history.messages())
            .await;
        match result {
            Ok(answer) => {
                self.cache.put(self.language, &question, &answer);
                self.history.push_user(question);
                self.history.push_assistant(answer.as_str());
                self.speak_text(answer);
            }
            Err(e) => {
                log::warn!("assistant: answering service failed: {e}");
                self.speak_text(self.language.apology().to_string());
            }
        }
    }

    fn speak_text(&mut self, text: String) {
        {
            let mut st = self.state.lock().unwrap();
            st.playback_error = None;
            st.last_answer = Some(text.clone());
        }
        if let Err(e) = self.playback.speak(&text, self.language) {
            log::warn!("assistant: playback failed: {e}");
            let mut st = self.state.lock().unwrap();
            st.playback_error = Some(e);
            st.phase = AssistantPhase::Idle;
        }
    }

    // -----------------------------------------------------------------------
    // Playback events
    // -----------------------------------------------------------------------

    fn handle_synthesis_event(&mut self, event: SynthesisEvent) {
        let started = event == SynthesisEvent::Started;
        let ended = matches!(event, SynthesisEvent::Ended | SynthesisEvent::Error(_));

        if let Some(error) = self.playback.on_event(event) {
            self.state.lock().unwrap().playback_error = Some(error);
        }

        let mut st = self.state.lock().unwrap();
        if started && !self.capture.is_listening() {
            st.phase = AssistantPhase::Speaking;
        } else if ended
            && matches!(
                st.phase,
                AssistantPhase::Speaking | AssistantPhase::Thinking
            )
        {
            st.phase = AssistantPhase::Idle;
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Last handle gone: release the engine, cancel the deadline and silence
    /// the speaker.  No transcript is delivered on this path.
    fn teardown(&mut self) {
        log::info!("assistant: shutting down");
        self.deadline = None;
        if let Some(mut session) = self.session.take() {
            session.engine.stop();
        }
        self.playback.stop();
        self.state.lock().unwrap().phase = AssistantPhase::Idle;
    }
}

// ---------------------------------------------------------------------------
// Loop plumbing
// ---------------------------------------------------------------------------

enum LoopEvent {
    Command(AssistantCommand),
    Recognizer(RecognizerEvent),
    Synthesis(SynthesisEvent),
    SilenceElapsed,
}

/// Next event from the live capture session; pends forever when no session
/// is open (or its channel has closed), keeping the select honest.
async fn next_recognizer_event(session: &mut Option<CaptureSession>) -> RecognizerEvent {
    match session {
        Some(session) => match session.events.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

/// Next synthesizer lifecycle event; pends forever once the channel closes
/// (synthesis unsupported, or the engine is gone).
async fn next_synthesis_event(events: &mut mpsc::Receiver<SynthesisEvent>) -> SynthesisEvent {
    match events.recv().await {
        Some(event) => event,
        None => std::future::pending().await,
    }
}

/// Resolves when the silence deadline passes; pends forever while disarmed.
async fn silence_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
