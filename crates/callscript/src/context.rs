//! The variable binding store: per-call context as an immutable snapshot.
//!
//! A [`CallContext`] is constructed once at call start from host-supplied
//! input (via [`CallContextBuilder`], which is also the serde entry point),
//! validated, and never mutated for the lifetime of the call. Lookup is
//! read-only by [`ContextField`]; an absent optional field is `None`, which
//! is deliberately distinct from a field present with an empty string.

use crate::error::CallScriptError;
use serde::{Deserialize, Serialize};

// ── Field names ────────────────────────────────────────────────────

/// Every field a call context can carry.
///
/// The string form ([`as_str`](ContextField::as_str)) doubles as the
/// placeholder name inside script segments, e.g. `{{patient_name}}`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContextField {
    PatientName,
    PatientAge,
    PatientGender,
    PatientAddress,
    PatientDob,
    ChiefComplaint,
    ReasonForCall,
    RecordsEmail,
    RelayCallbackNumber,
    HospitalCallbackNumber,
    CaseId,
}

/// Fields that must be present for any call to proceed.
///
/// Everything else is optional and degrades gracefully through the
/// disclosure policy.
pub const REQUIRED_FIELDS: [ContextField; 4] = [
    ContextField::PatientName,
    ContextField::ChiefComplaint,
    ContextField::RecordsEmail,
    ContextField::RelayCallbackNumber,
];

impl ContextField {
    /// Canonical snake_case name, matching script placeholder syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatientName => "patient_name",
            Self::PatientAge => "patient_age",
            Self::PatientGender => "patient_gender",
            Self::PatientAddress => "patient_address",
            Self::PatientDob => "patient_dob",
            Self::ChiefComplaint => "chief_complaint",
            Self::ReasonForCall => "reason_for_call",
            Self::RecordsEmail => "records_email",
            Self::RelayCallbackNumber => "relay_callback_number",
            Self::HospitalCallbackNumber => "hospital_callback_number",
            Self::CaseId => "case_id",
        }
    }

    /// Resolve a placeholder name back to a field. `None` for unknown names.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "patient_name" => Some(Self::PatientName),
            "patient_age" => Some(Self::PatientAge),
            "patient_gender" => Some(Self::PatientGender),
            "patient_address" => Some(Self::PatientAddress),
            "patient_dob" => Some(Self::PatientDob),
            "chief_complaint" => Some(Self::ChiefComplaint),
            "reason_for_call" => Some(Self::ReasonForCall),
            "records_email" => Some(Self::RecordsEmail),
            "relay_callback_number" => Some(Self::RelayCallbackNumber),
            "hospital_callback_number" => Some(Self::HospitalCallbackNumber),
            "case_id" => Some(Self::CaseId),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CallContext ────────────────────────────────────────────────────

/// Immutable per-call data snapshot.
///
/// Required fields are plain `String`s; optional fields are `Option<String>`
/// so "absent" is never conflated with "empty". `reason_for_call` is derived
/// from the chief complaint at build time when the host does not supply one,
/// so it is always present after construction.
#[derive(Serialize, Debug, Clone)]
pub struct CallContext {
    patient_name: String,
    chief_complaint: String,
    reason_for_call: String,
    records_email: String,
    relay_callback_number: String,
    patient_age: Option<String>,
    patient_gender: Option<String>,
    patient_address: Option<String>,
    patient_dob: Option<String>,
    hospital_callback_number: Option<String>,
    case_id: Option<String>,
}

impl CallContext {
    /// Start building a context.
    pub fn builder() -> CallContextBuilder {
        CallContextBuilder::default()
    }

    /// Read-only lookup by field name.
    ///
    /// Returns `None` only for optional fields that were not supplied;
    /// required fields always resolve.
    pub fn field(&self, field: ContextField) -> Option<&str> {
        match field {
            ContextField::PatientName => Some(&self.patient_name),
            ContextField::ChiefComplaint => Some(&self.chief_complaint),
            ContextField::ReasonForCall => Some(&self.reason_for_call),
            ContextField::RecordsEmail => Some(&self.records_email),
            ContextField::RelayCallbackNumber => Some(&self.relay_callback_number),
            ContextField::PatientAge => self.patient_age.as_deref(),
            ContextField::PatientGender => self.patient_gender.as_deref(),
            ContextField::PatientAddress => self.patient_address.as_deref(),
            ContextField::PatientDob => self.patient_dob.as_deref(),
            ContextField::HospitalCallbackNumber => self.hospital_callback_number.as_deref(),
            ContextField::CaseId => self.case_id.as_deref(),
        }
    }

    /// The patient this call is about.
    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    /// Email address the GP should send records to.
    pub fn records_email(&self) -> &str {
        &self.records_email
    }

    /// Number given to the counterpart whenever information is withheld.
    pub fn relay_callback_number(&self) -> &str {
        &self.relay_callback_number
    }
}

// ── Builder ────────────────────────────────────────────────────────

/// Builder (and serde input shape) for [`CallContext`].
///
/// Every field is optional at this stage; [`build`](Self::build) enforces
/// [`REQUIRED_FIELDS`] and fails with the first missing one.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CallContextBuilder {
    pub patient_name: Option<String>,
    pub chief_complaint: Option<String>,
    pub reason_for_call: Option<String>,
    pub records_email: Option<String>,
    pub relay_callback_number: Option<String>,
    pub patient_age: Option<String>,
    pub patient_gender: Option<String>,
    pub patient_address: Option<String>,
    pub patient_dob: Option<String>,
    pub hospital_callback_number: Option<String>,
    pub case_id: Option<String>,
}

impl CallContextBuilder {
    pub fn with_patient_name(mut self, value: impl Into<String>) -> Self {
        self.patient_name = Some(value.into());
        self
    }

    pub fn with_chief_complaint(mut self, value: impl Into<String>) -> Self {
        self.chief_complaint = Some(value.into());
        self
    }

    pub fn with_reason_for_call(mut self, value: impl Into<String>) -> Self {
        self.reason_for_call = Some(value.into());
        self
    }

    pub fn with_records_email(mut self, value: impl Into<String>) -> Self {
        self.records_email = Some(value.into());
        self
    }

    pub fn with_relay_callback_number(mut self, value: impl Into<String>) -> Self {
        self.relay_callback_number = Some(value.into());
        self
    }

    pub fn with_patient_age(mut self, value: impl Into<String>) -> Self {
        self.patient_age = Some(value.into());
        self
    }

    pub fn with_patient_gender(mut self, value: impl Into<String>) -> Self {
        self.patient_gender = Some(value.into());
        self
    }

    pub fn with_patient_address(mut self, value: impl Into<String>) -> Self {
        self.patient_address = Some(value.into());
        self
    }

    pub fn with_patient_dob(mut self, value: impl Into<String>) -> Self {
        self.patient_dob = Some(value.into());
        self
    }

    pub fn with_hospital_callback_number(mut self, value: impl Into<String>) -> Self {
        self.hospital_callback_number = Some(value.into());
        self
    }

    pub fn with_case_id(mut self, value: impl Into<String>) -> Self {
        self.case_id = Some(value.into());
        self
    }

    /// Validate required fields and freeze the context.
    ///
    /// Fails with [`CallScriptError::MissingRequiredField`] naming the first
    /// required field that was not supplied. When `reason_for_call` is
    /// absent it is derived from the chief complaint.
    pub fn build(self) -> Result<CallContext, CallScriptError> {
        let required = |value: Option<String>, field: ContextField| {
            value.ok_or(CallScriptError::MissingRequiredField(field))
        };

        let patient_name = required(self.patient_name, ContextField::PatientName)?;
        let chief_complaint = required(self.chief_complaint, ContextField::ChiefComplaint)?;
        let records_email = required(self.records_email, ContextField::RecordsEmail)?;
        let relay_callback_number = required(
            self.relay_callback_number,
            ContextField::RelayCallbackNumber,
        )?;

        let reason_for_call = self.reason_for_call.unwrap_or_else(|| {
            format!(
                "The patient is on the way to the hospital. Reason for transport: {chief_complaint}."
            )
        });

        Ok(CallContext {
            patient_name,
            chief_complaint,
            reason_for_call,
            records_email,
            relay_callback_number,
            patient_age: self.patient_age,
            patient_gender: self.patient_gender,
            patient_address: self.patient_address,
            patient_dob: self.patient_dob,
            hospital_callback_number: self.hospital_callback_number,
            case_id: self.case_id,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> CallContextBuilder {
        CallContext::builder()
            .with_patient_name("Jane Doe")
            .with_chief_complaint("chest pain")
            .with_records_email("records_relay@treehacks.com")
            .with_relay_callback_number("123450")
    }

    #[test]
    fn minimal_context_builds() {
        let ctx = minimal_builder().build().unwrap();
        assert_eq!(ctx.patient_name(), "Jane Doe");
        assert_eq!(ctx.records_email(), "records_relay@treehacks.com");
        assert_eq!(ctx.relay_callback_number(), "123450");
    }

    #[test]
    fn missing_required_field_fails_construction() {
        let err = CallContext::builder()
            .with_patient_name("Jane Doe")
            .with_records_email("e@x.com")
            .with_relay_callback_number("123450")
            .build()
            .unwrap_err();
        match err {
            CallScriptError::MissingRequiredField(field) => {
                assert_eq!(field, ContextField::ChiefComplaint);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absent_optional_field_is_none_not_empty() {
        let ctx = minimal_builder().build().unwrap();
        assert_eq!(ctx.field(ContextField::PatientAge), None);

        let ctx = minimal_builder().with_patient_age("").build().unwrap();
        // Empty string was supplied, so the field is present.
        assert_eq!(ctx.field(ContextField::PatientAge), Some(""));
    }

    #[test]
    fn reason_for_call_derived_from_chief_complaint() {
        let ctx = minimal_builder().build().unwrap();
        let reason = ctx.field(ContextField::ReasonForCall).unwrap();
        assert!(reason.contains("chest pain"));
        assert!(reason.contains("on the way to the hospital"));
    }

    #[test]
    fn supplied_reason_for_call_is_kept_verbatim() {
        let ctx = minimal_builder()
            .with_reason_for_call("Routine records transfer.")
            .build()
            .unwrap();
        assert_eq!(
            ctx.field(ContextField::ReasonForCall),
            Some("Routine records transfer.")
        );
    }

    #[test]
    fn field_names_roundtrip() {
        for field in [
            ContextField::PatientName,
            ContextField::PatientDob,
            ContextField::RelayCallbackNumber,
            ContextField::CaseId,
        ] {
            assert_eq!(ContextField::from_key(field.as_str()), Some(field));
        }
        assert_eq!(ContextField::from_key("blood_type"), None);
    }

    #[test]
    fn builder_deserializes_from_host_json() {
        let json = r#"{
            "patient_name": "Jane Doe",
            "patient_age": "72",
            "chief_complaint": "chest pain",
            "records_email": "records_relay@treehacks.com",
            "relay_callback_number": "123450"
        }"#;
        let builder: CallContextBuilder = serde_json::from_str(json).unwrap();
        let ctx = builder.build().unwrap();
        assert_eq!(ctx.field(ContextField::PatientAge), Some("72"));
        assert_eq!(ctx.field(ContextField::PatientGender), None);
    }
}
