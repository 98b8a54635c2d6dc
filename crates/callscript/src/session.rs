//! The dialogue turn resolver: per-call state machine over the script.
//!
//! A [`ScriptEngine`] bundles the read-only shared configuration (script
//! template plus disclosure policy) and is reused across calls behind an
//! [`Arc`]. Each call owns a [`CallSession`]: context, resolver state, and
//! transcript, with no shared mutable state between concurrent calls.
//!
//! State machine:
//!
//! ```text
//! Opening --open()--> RecordsRequest --question--> Clarification <--+
//!                          |                          |    |        |
//!                          |                          |    +--question
//!                          +------agree/hangup--------+
//!                                                     v
//!                                               Closing --> Ended
//! ```
//!
//! A withheld fact stays within `Clarification` and emits the fallback
//! utterance; withholding never ends the call. The host hands the session a
//! classified turn and gets back a rendered utterance plus the next state;
//! waiting for speech, timeouts, and cancellation all live outside this
//! boundary.

use crate::context::CallContext;
use crate::error::CallScriptError;
use crate::events::{CallEvent, CallObserver, NoopObserver};
use crate::policy::{DisclosureDecision, DisclosurePolicy, FactRequest};
use crate::script::{ScriptTemplate, SegmentId};
use crate::transcript::{Speaker, Transcript};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

// ── States and turns ───────────────────────────────────────────────

/// Resolver state for one call.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Opening,
    RecordsRequest,
    Clarification,
    Closing,
    Ended,
}

impl CallState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::RecordsRequest => "records_request",
            Self::Clarification => "clarification",
            Self::Closing => "closing",
            Self::Ended => "ended",
        }
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the counterpart's turn meant, as classified by the host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterpartSignal {
    /// A question, reduced to one canonical fact key.
    Question(FactRequest),
    /// Explicit agreement to send the records.
    AgreeToSend,
    /// The call is terminating without explicit agreement.
    Hangup,
}

/// One incoming counterpart turn: the raw utterance (for the transcript)
/// plus its classification.
#[derive(Debug, Clone)]
pub struct CounterpartTurn {
    pub text: String,
    pub signal: CounterpartSignal,
}

impl CounterpartTurn {
    pub fn question(text: impl Into<String>, request: FactRequest) -> Self {
        Self {
            text: text.into(),
            signal: CounterpartSignal::Question(request),
        }
    }

    pub fn agreement(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            signal: CounterpartSignal::AgreeToSend,
        }
    }

    /// Termination with nothing said; no counterpart transcript entry is
    /// recorded.
    pub fn hangup() -> Self {
        Self {
            text: String::new(),
            signal: CounterpartSignal::Hangup,
        }
    }
}

/// A resolved agent turn: the rendered text plus the state after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub state: CallState,
}

// ── Engine ─────────────────────────────────────────────────────────

/// Process-wide immutable configuration: script plus policy.
///
/// Initialized once at startup and shared across all calls; never mutated
/// thereafter.
#[derive(Debug, Clone)]
pub struct ScriptEngine {
    template: ScriptTemplate,
    policy: DisclosurePolicy,
}

impl ScriptEngine {
    pub fn new(template: ScriptTemplate, policy: DisclosurePolicy) -> Self {
        Self { template, policy }
    }

    /// Engine with the stock GP records-request script.
    pub fn gp_records() -> Self {
        Self::new(ScriptTemplate::gp_records(), DisclosurePolicy::new())
    }

    pub fn template(&self) -> &ScriptTemplate {
        &self.template
    }

    /// Start an independent session for one call.
    pub fn start_call(self: &Arc<Self>, context: CallContext) -> CallSession {
        CallSession::new(Arc::clone(self), context)
    }
}

// ── Session ────────────────────────────────────────────────────────

/// Per-call value object: context, resolver state, and transcript.
///
/// Strictly sequential: one turn is resolved, rendered, and recorded before
/// the next is accepted.
pub struct CallSession {
    engine: Arc<ScriptEngine>,
    context: CallContext,
    state: CallState,
    records_requested: bool,
    transcript: Transcript,
    observer: Box<dyn CallObserver>,
}

impl CallSession {
    pub fn new(engine: Arc<ScriptEngine>, context: CallContext) -> Self {
        Self {
            engine,
            context,
            state: CallState::Opening,
            records_requested: false,
            transcript: Transcript::new(),
            observer: Box::new(NoopObserver),
        }
    }

    /// Attach an observer for call events (builder pattern).
    pub fn with_observer(mut self, observer: impl CallObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Consume the session, yielding the immutable transcript.
    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// Emit the opening utterance. Valid exactly once, at call start.
    ///
    /// Transitions unconditionally to `RecordsRequest`.
    pub fn open(&mut self) -> Result<Utterance, CallScriptError> {
        if self.state != CallState::Opening {
            return Err(CallScriptError::TurnOutOfOrder(self.state));
        }
        self.observer.on_event(&CallEvent::CallStarted {
            patient: self.context.patient_name(),
        });

        let text = self.engine.template.render(SegmentId::Opening, &self.context)?;
        self.record_agent(SegmentId::Opening, &text);
        self.transition(CallState::RecordsRequest);
        Ok(self.utterance(text))
    }

    /// Emit the records request. Valid exactly once, after [`open`](Self::open).
    ///
    /// The state stays `RecordsRequest`; the session now waits for
    /// counterpart input.
    pub fn request_records(&mut self) -> Result<Utterance, CallScriptError> {
        if self.state != CallState::RecordsRequest || self.records_requested {
            return Err(CallScriptError::TurnOutOfOrder(self.state));
        }
        let text = self
            .engine
            .template
            .render(SegmentId::RecordsRequest, &self.context)?;
        self.record_agent(SegmentId::RecordsRequest, &text);
        self.records_requested = true;
        Ok(self.utterance(text))
    }

    /// Resolve one counterpart turn into the next agent utterance.
    ///
    /// Questions are answered through the disclosure policy and keep the
    /// call in `Clarification`; agreement or hangup triggers the closing
    /// utterance and ends the call.
    pub fn handle(&mut self, turn: CounterpartTurn) -> Result<Utterance, CallScriptError> {
        let accepting = self.records_requested
            && matches!(
                self.state,
                CallState::RecordsRequest | CallState::Clarification
            );
        if !accepting {
            return Err(CallScriptError::TurnOutOfOrder(self.state));
        }

        if !turn.text.is_empty() {
            self.transcript
                .append(Speaker::Counterpart, None, turn.text.as_str());
        }

        match turn.signal {
            CounterpartSignal::Question(request) => self.resolve_question(&request),
            CounterpartSignal::AgreeToSend | CounterpartSignal::Hangup => self.close(),
        }
    }

    fn resolve_question(
        &mut self,
        request: &FactRequest,
    ) -> Result<Utterance, CallScriptError> {
        let decision = self.engine.policy.evaluate(request, &self.context);
        debug!("resolved `{}` in state {}", request.key(), self.state);

        let (segment, text) = match decision {
            DisclosureDecision::Disclosed { key, value } => {
                let text = self.engine.template.render_disclosure(key, &value)?;
                self.observer.on_event(&CallEvent::FactDisclosed { key });
                (SegmentId::Disclosure, text)
            }
            DisclosureDecision::Withheld { callback } => {
                let text = self.engine.template.render_fallback(&callback)?;
                self.observer.on_event(&CallEvent::FactWithheld {
                    key: request.key(),
                    recognized: request.fact_key().is_some(),
                });
                (SegmentId::Fallback, text)
            }
        };

        self.transition(CallState::Clarification);
        self.record_agent(segment, &text);
        Ok(self.utterance(text))
    }

    fn close(&mut self) -> Result<Utterance, CallScriptError> {
        let text = self.engine.template.render(SegmentId::Closing, &self.context)?;
        self.transition(CallState::Closing);
        self.record_agent(SegmentId::Closing, &text);
        self.transition(CallState::Ended);
        self.observer.on_event(&CallEvent::CallEnded {
            turns: self.transcript.len(),
        });
        Ok(self.utterance(text))
    }

    fn record_agent(&mut self, segment: SegmentId, text: &str) {
        self.transcript.append(Speaker::Agent, Some(segment), text);
        self.observer
            .on_event(&CallEvent::UtteranceResolved { segment, text });
    }

    fn transition(&mut self, to: CallState) {
        if self.state != to {
            self.observer.on_event(&CallEvent::StateChanged {
                from: self.state,
                to,
            });
            self.state = to;
        }
    }

    fn utterance(&self, text: String) -> Utterance {
        Utterance {
            text,
            state: self.state,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
