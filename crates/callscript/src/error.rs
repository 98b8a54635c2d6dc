//! Error taxonomy for the call-script engine.
//!
//! The engine distinguishes three failure classes:
//!
//! - **Construction failures** ([`CallScriptError::MissingRequiredField`]):
//!   fatal to starting the call, surfaced to the invoking host, never
//!   silently defaulted.
//! - **Authored-data defects** ([`CallScriptError::UnknownPlaceholder`],
//!   [`CallScriptError::UnterminatedPlaceholder`]): a script segment
//!   references something no binding or policy path can resolve. These halt
//!   rendering of the segment rather than emitting malformed text.
//! - **Host protocol misuse** ([`CallScriptError::TurnOutOfOrder`]): a turn
//!   was delivered in a state that cannot accept it.
//!
//! An unclassifiable fact request is deliberately *not* an error: the policy
//! recovers locally by withholding, and the conversation continues.

use crate::context::ContextField;
use crate::script::SegmentId;
use crate::session::CallState;
use thiserror::Error;

/// All errors the engine can surface to a host.
#[derive(Debug, Error)]
pub enum CallScriptError {
    /// A field required for any call to proceed was absent at construction.
    #[error("required call context field `{0}` is missing")]
    MissingRequiredField(ContextField),

    /// A segment template references a placeholder with no corresponding
    /// context field or policy binding. Indicates a script/policy mismatch.
    #[error("segment `{segment}` references unknown placeholder `{placeholder}`")]
    UnknownPlaceholder {
        segment: SegmentId,
        placeholder: String,
    },

    /// A segment template opens a `{{` that is never closed.
    #[error("segment `{segment}` contains an unterminated placeholder")]
    UnterminatedPlaceholder { segment: SegmentId },

    /// A counterpart turn arrived in a state that cannot accept it.
    #[error("turn cannot be resolved in call state `{0}`")]
    TurnOutOfOrder(CallState),

    /// Transcript audit export failed at the filesystem level.
    #[error("failed to write transcript: {0}")]
    Io(#[from] std::io::Error),

    /// Transcript audit export failed to serialize.
    #[error("failed to serialize transcript: {0}")]
    Json(#[from] serde_json::Error),
}
