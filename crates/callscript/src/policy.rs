//! The disclosure policy: the single authority on what the agent may say.
//!
//! Every question the counterpart asks is reduced to a [`FactRequest`] and
//! evaluated here against the call context. The outcome is a tagged
//! [`DisclosureDecision`]: reveal a value copied verbatim from the context,
//! or withhold and offer the relay callback number. Centralizing this in one
//! total function keeps disclosure consistent across every dialogue turn,
//! which is the core correctness property of the whole script.
//!
//! The policy is permissive for the enumerated fact keys and refuses
//! silently for everything else: an unrecognized key is withheld, never
//! guessed at, and never fatal to the conversation.

use crate::context::{CallContext, ContextField};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ── Fact keys ──────────────────────────────────────────────────────

/// The canonical facts the counterpart may ask about.
///
/// Destination and ETA are enumerated but have no backing context field:
/// the script never discloses them, it offers the callback instead.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FactKey {
    HospitalDestination,
    Eta,
    PatientName,
    PatientAge,
    PatientGender,
    PatientAddress,
    PatientDob,
    TransportReason,
    CaseId,
}

impl FactKey {
    /// Canonical key string, as produced by question classification.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HospitalDestination => "hospital_destination",
            Self::Eta => "eta",
            Self::PatientName => "patient_name",
            Self::PatientAge => "patient_age",
            Self::PatientGender => "patient_gender",
            Self::PatientAddress => "patient_address",
            Self::PatientDob => "patient_dob",
            Self::TransportReason => "transport_reason",
            Self::CaseId => "case_id",
        }
    }

    /// Resolve a canonical key string. `None` for anything outside the
    /// enumerated set.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "hospital_destination" => Some(Self::HospitalDestination),
            "eta" => Some(Self::Eta),
            "patient_name" => Some(Self::PatientName),
            "patient_age" => Some(Self::PatientAge),
            "patient_gender" => Some(Self::PatientGender),
            "patient_address" => Some(Self::PatientAddress),
            "patient_dob" => Some(Self::PatientDob),
            "transport_reason" => Some(Self::TransportReason),
            "case_id" => Some(Self::CaseId),
            _ => None,
        }
    }

    /// Human label used in disclosure utterances.
    pub fn label(self) -> &'static str {
        match self {
            Self::HospitalDestination => "destination hospital",
            Self::Eta => "estimated arrival time",
            Self::PatientName => "name",
            Self::PatientAge => "age",
            Self::PatientGender => "gender",
            Self::PatientAddress => "home address",
            Self::PatientDob => "date of birth",
            Self::TransportReason => "reason for transport",
            Self::CaseId => "case reference",
        }
    }

    /// The context field this key may be answered from, if any.
    pub fn source_field(self) -> Option<ContextField> {
        match self {
            Self::HospitalDestination | Self::Eta => None,
            Self::PatientName => Some(ContextField::PatientName),
            Self::PatientAge => Some(ContextField::PatientAge),
            Self::PatientGender => Some(ContextField::PatientGender),
            Self::PatientAddress => Some(ContextField::PatientAddress),
            Self::PatientDob => Some(ContextField::PatientDob),
            Self::TransportReason => Some(ContextField::ChiefComplaint),
            Self::CaseId => Some(ContextField::CaseId),
        }
    }
}

impl std::fmt::Display for FactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Fact requests ──────────────────────────────────────────────────

/// A classified question from the counterpart, reduced to one canonical
/// fact key string. Created per incoming utterance; ephemeral.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FactRequest {
    key: String,
}

impl FactRequest {
    /// Wrap a host-supplied key string. The string need not be in the
    /// enumerated set; unrecognized keys are withheld at evaluation.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// A request for a known fact key.
    pub fn for_key(key: FactKey) -> Self {
        Self::new(key.as_str())
    }

    /// The raw key string as supplied.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The enumerated fact key, when the raw string is recognized.
    pub fn fact_key(&self) -> Option<FactKey> {
        FactKey::from_key(&self.key)
    }
}

// ── Decisions ──────────────────────────────────────────────────────

/// Outcome of evaluating one fact request.
///
/// An explicit tagged variant rather than exception-style control flow:
/// callers must handle both branches, and a `Disclosed` value always comes
/// verbatim from a context field present for this call.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum DisclosureDecision {
    /// The fact is known for this call; reveal exactly this value.
    Disclosed { key: FactKey, value: String },
    /// The fact is unknown, unbacked, or unrecognized; offer the relay
    /// callback number instead.
    Withheld { callback: String },
}

impl DisclosureDecision {
    pub fn is_disclosed(&self) -> bool {
        matches!(self, Self::Disclosed { .. })
    }
}

// ── Policy ─────────────────────────────────────────────────────────

/// A total function from fact request to disclosure decision.
///
/// Stateless read-only configuration; one instance is safely shared across
/// all concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisclosurePolicy;

impl DisclosurePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one request against the call context.
    ///
    /// Total: every input maps to a decision. Unrecognized keys log a
    /// warning and are withheld; they never abort the call.
    pub fn evaluate(&self, request: &FactRequest, ctx: &CallContext) -> DisclosureDecision {
        let withheld = || DisclosureDecision::Withheld {
            callback: ctx.relay_callback_number().to_string(),
        };

        let Some(key) = request.fact_key() else {
            warn!("unclassified fact request `{}`: withholding", request.key());
            return withheld();
        };

        match key.source_field().and_then(|field| ctx.field(field)) {
            Some(value) => {
                debug!("disclosing `{key}` from call context");
                DisclosureDecision::Disclosed {
                    key,
                    value: value.to_string(),
                }
            }
            None => {
                debug!("`{key}` not available for this call: withholding");
                withheld()
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
