//! Deterministic call-script policy engine for automated GP records-request
//! calls.
//!
//! `callscript` is the core of an outbound-calling agent that asks a GP
//! practice to email a patient's medical records. It binds call-specific
//! data into a dialogue script, decides turn by turn what the agent may
//! disclose versus what it must decline with a callback instruction, and
//! produces an auditable transcript of what was said and why. Placing the
//! phone call, speech recognition, and text-to-speech are the hosting
//! platform's job; this crate is the synchronous decision core it drives.
//!
//! # Getting started
//!
//! ```
//! use callscript::prelude::*;
//! use std::sync::Arc;
//!
//! // Shared read-only configuration, reused across calls.
//! let engine = Arc::new(ScriptEngine::gp_records());
//!
//! // Immutable per-call context; construction validates required fields.
//! let context = CallContext::builder()
//!     .with_patient_name("Jane Doe")
//!     .with_patient_age("72")
//!     .with_chief_complaint("chest pain")
//!     .with_records_email(callscript::DEFAULT_RECORDS_EMAIL)
//!     .with_relay_callback_number(callscript::DEFAULT_RELAY_CALLBACK_NUMBER)
//!     .build()?;
//!
//! let mut call = engine.start_call(context);
//!
//! // Agent-initiated turns.
//! let opening = call.open()?;
//! assert!(opening.text.contains("Jane Doe"));
//! call.request_records()?;
//!
//! // A clarification turn: the disclosure policy answers from the context.
//! let answer = call.handle(CounterpartTurn::question(
//!     "How old is the patient?",
//!     FactRequest::for_key(FactKey::PatientAge),
//! ))?;
//! assert!(answer.text.contains("72"));
//!
//! // Agreement ends the call with a single closing utterance.
//! let closing = call.handle(CounterpartTurn::agreement("Yes, sending now."))?;
//! assert_eq!(closing.state, CallState::Ended);
//!
//! let transcript = call.into_transcript();
//! assert_eq!(transcript.entries()[0].segment, Some(SegmentId::Opening));
//! # Ok::<(), callscript::CallScriptError>(())
//! ```
//!
//! # Where to find things
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | [`CallContext`](context::CallContext) binding store and builder |
//! | [`script`] | [`ScriptTemplate`](script::ScriptTemplate) segments and rendering |
//! | [`policy`] | [`DisclosurePolicy`](policy::DisclosurePolicy), fact keys, decisions |
//! | [`session`] | [`CallSession`](session::CallSession) turn resolver state machine |
//! | [`transcript`] | Append-only [`Transcript`](transcript::Transcript) and audit export |
//! | [`events`] | [`CallObserver`](events::CallObserver) lifecycle observation |
//! | [`classify`] | Keyword stub for the speech-understanding boundary |
//!
//! # Design notes
//!
//! 1. **One disclosure authority.** Every fact the agent utters about the
//!    patient flows through [`DisclosurePolicy`](policy::DisclosurePolicy),
//!    so disclosure stays consistent across turns.
//! 2. **Withholding never hangs up.** A withheld fact emits the fallback
//!    utterance with the relay callback number and the call continues.
//! 3. **Per-call isolation.** Sessions own their context, state, and
//!    transcript; the engine is immutable shared configuration.
//! 4. **Deterministic and auditable.** Rendering is pure; the transcript is
//!    append-only and exportable as JSON.

pub mod classify;
pub mod context;
pub mod error;
pub mod events;
pub mod policy;
pub mod prelude;
pub mod script;
pub mod session;
pub mod transcript;

pub use error::CallScriptError;

// ── Documented defaults ────────────────────────────────────────────
//
// Applied by the invoking host (the CLI here) when its environment does not
// override them; the core itself never defaults silently.

/// Default email address GPs are asked to send records to.
pub const DEFAULT_RECORDS_EMAIL: &str = "records_relay@treehacks.com";

/// Default number offered to the counterpart when information is withheld.
pub const DEFAULT_RELAY_CALLBACK_NUMBER: &str = "123450";

/// Default hospital callback number for the closing utterance.
pub const DEFAULT_HOSPITAL_CALLBACK_NUMBER: &str = "+1-555-0100";
