//! Events and observers for a [`CallSession`](crate::session::CallSession).
//!
//! The session reports the full lifecycle of a call through [`CallEvent`]
//! variants. Hosts implement [`CallObserver`] to watch them for logging,
//! metrics, dashboards, or any other side effects.
//!
//! | Observer | Use case |
//! |----------|----------|
//! | [`NoopObserver`] | Tests or fire-and-forget calls |
//! | [`LoggingObserver`] | Structured logging via `tracing` |
//! | [`FnObserver`] | Quick closures for simple callbacks |
//! | [`CompositeObserver`] | Compose multiple observers in order |

use crate::policy::FactKey;
use crate::script::SegmentId;
use crate::session::CallState;
use tracing::{debug, info, warn};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted while a call session resolves turns.
#[derive(Debug)]
pub enum CallEvent<'a> {
    /// A session was created for a patient.
    CallStarted { patient: &'a str },
    /// The resolver moved to a new state.
    StateChanged { from: CallState, to: CallState },
    /// An agent utterance was rendered and recorded.
    UtteranceResolved { segment: SegmentId, text: &'a str },
    /// The policy revealed a fact from the call context.
    FactDisclosed { key: FactKey },
    /// The policy withheld a fact. `recognized` is false when the request
    /// key was outside the enumerated set.
    FactWithheld { key: &'a str, recognized: bool },
    /// The call reached its terminal state.
    CallEnded { turns: usize },
}

/// Observer for call events.
///
/// All events are informational; the default implementation does nothing.
pub trait CallObserver: Send + Sync {
    fn on_event(&self, event: &CallEvent<'_>) {
        let _ = event;
    }
}

/// An observer that ignores everything.
pub struct NoopObserver;
impl CallObserver for NoopObserver {}

/// An observer backed by a closure.
///
/// Wraps a `Fn(&CallEvent)` into a [`CallObserver`] implementation, avoiding
/// the boilerplate of a full struct and impl for simple observation.
pub struct FnObserver<F>(F)
where
    F: Fn(&CallEvent<'_>) + Send + Sync;

impl<F> FnObserver<F>
where
    F: Fn(&CallEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> CallObserver for FnObserver<F>
where
    F: Fn(&CallEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &CallEvent<'_>) {
        (self.0)(event)
    }
}

/// An observer that delegates to multiple inner observers in order.
pub struct CompositeObserver {
    observers: Vec<Box<dyn CallObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the chain. Observers are called in registration
    /// order.
    pub fn with(mut self, observer: impl CallObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl CallObserver for CompositeObserver {
    fn on_event(&self, event: &CallEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// An observer that logs events via `tracing`.
pub struct LoggingObserver;

impl CallObserver for LoggingObserver {
    fn on_event(&self, event: &CallEvent<'_>) {
        match event {
            CallEvent::CallStarted { patient } => {
                info!("call started for patient {patient}");
            }
            CallEvent::StateChanged { from, to } => {
                debug!("state: {from} -> {to}");
            }
            CallEvent::UtteranceResolved { segment, text } => {
                debug!("[{segment}] {} chars resolved", text.len());
            }
            CallEvent::FactDisclosed { key } => {
                info!("disclosed fact `{key}`");
            }
            CallEvent::FactWithheld { key, recognized } => {
                if *recognized {
                    info!("withheld fact `{key}` (not available for this call)");
                } else {
                    warn!("withheld unrecognized fact request `{key}`");
                }
            }
            CallEvent::CallEnded { turns } => {
                info!("call ended after {turns} transcript turn(s)");
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
