//! Convenience re-exports for common `callscript` types.
//!
//! Meant to be glob-imported by hosts driving calls:
//!
//! ```
//! use callscript::prelude::*;
//! ```

// ── Core types ──────────────────────────────────────────────────────
pub use crate::error::CallScriptError;

// ── Binding store ───────────────────────────────────────────────────
pub use crate::context::{CallContext, CallContextBuilder, ContextField, REQUIRED_FIELDS};

// ── Script ──────────────────────────────────────────────────────────
pub use crate::script::{ScriptSegment, ScriptTemplate, SegmentId, SegmentPart};

// ── Policy ──────────────────────────────────────────────────────────
pub use crate::policy::{DisclosureDecision, DisclosurePolicy, FactKey, FactRequest};

// ── Turn resolution ─────────────────────────────────────────────────
pub use crate::session::{
    CallSession, CallState, CounterpartSignal, CounterpartTurn, ScriptEngine, Utterance,
};

// ── Transcript ──────────────────────────────────────────────────────
pub use crate::transcript::{Speaker, Transcript, TranscriptEntry};

// ── Observation ─────────────────────────────────────────────────────
pub use crate::events::{
    CallEvent, CallObserver, CompositeObserver, FnObserver, LoggingObserver, NoopObserver,
};

// ── Host boundary stub ──────────────────────────────────────────────
pub use crate::classify::{Classification, KeywordClassifier};
