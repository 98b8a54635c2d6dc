//! The dialogue script: ordered segments of literal text and placeholders.
//!
//! A [`ScriptTemplate`] holds one [`ScriptSegment`] per [`SegmentId`]. Each
//! segment is a sequence of [`SegmentPart`]s, literal text with embedded
//! `{{placeholder}}` references. Rendering substitutes placeholders from the
//! call context; a part that references an absent optional field is skipped
//! wholesale, so the agent never utters template syntax or half-filled
//! clauses like `aged {{patient_age}}`.
//!
//! Segments are authored data and immutable at runtime. A placeholder that
//! names no known field is an authoring defect and fails the whole segment
//! (see [`CallScriptError::UnknownPlaceholder`]); an absent *optional* field
//! is a normal runtime data gap and degrades by dropping the part.

use crate::context::{CallContext, ContextField};
use crate::error::CallScriptError;
use crate::policy::FactKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Segment identity ───────────────────────────────────────────────

/// The fixed dialogue units of a records-request call.
///
/// `Opening` and `RecordsRequest` are agent-initiated and emitted exactly
/// once per call. `Disclosure` and `Fallback` serve clarification turns and
/// may render any number of times. `Closing` is emitted exactly once,
/// on agreement or call termination.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SegmentId {
    Opening,
    RecordsRequest,
    Disclosure,
    Fallback,
    Closing,
}

impl SegmentId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::RecordsRequest => "records_request",
            Self::Disclosure => "disclosure",
            Self::Fallback => "fallback",
            Self::Closing => "closing",
        }
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Segments ───────────────────────────────────────────────────────

/// One renderable clause of a segment.
///
/// Parts carry their own leading punctuation and whitespace so that
/// skipping an optional part leaves well-formed text behind.
#[derive(Debug, Clone)]
pub struct SegmentPart {
    pub text: String,
}

impl SegmentPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// An ordered dialogue unit: id plus the parts that make up its utterance.
#[derive(Debug, Clone)]
pub struct ScriptSegment {
    pub id: SegmentId,
    pub parts: Vec<SegmentPart>,
}

impl ScriptSegment {
    pub fn new(id: SegmentId, parts: impl IntoIterator<Item = SegmentPart>) -> Self {
        Self {
            id,
            parts: parts.into_iter().collect(),
        }
    }
}

// ── Template ───────────────────────────────────────────────────────

/// How a single placeholder resolved during substitution.
enum Resolution<'a> {
    Value(&'a str),
    Absent,
    Unknown,
}

/// The full authored script. Read-only shared configuration, safely
/// reusable across concurrent calls.
#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    segments: Vec<ScriptSegment>,
}

impl ScriptTemplate {
    /// The stock GP records-request script.
    pub fn gp_records() -> Self {
        let segments = vec![
            ScriptSegment::new(
                SegmentId::Opening,
                [
                    SegmentPart::new(
                        "Hello, this is an automated assistant calling from the emergency \
                         medical relay service.",
                    ),
                    SegmentPart::new(" I'm calling about your patient {{patient_name}}"),
                    SegmentPart::new(", aged {{patient_age}}"),
                    SegmentPart::new(", {{patient_gender}}"),
                    SegmentPart::new(". {{reason_for_call}}"),
                    SegmentPart::new(
                        " We need their medical records sent to {{records_email}} as soon \
                         as possible.",
                    ),
                ],
            ),
            ScriptSegment::new(
                SegmentId::RecordsRequest,
                [SegmentPart::new(
                    "Could you please email {{patient_name}}'s medical records, including \
                     current medications, allergies, and recent history, to \
                     {{records_email}}? This is urgent; the patient is being transported now.",
                )],
            ),
            ScriptSegment::new(
                SegmentId::Disclosure,
                [SegmentPart::new(
                    "Yes. The patient's {{fact_label}} is {{fact_value}}.",
                )],
            ),
            ScriptSegment::new(
                SegmentId::Fallback,
                [SegmentPart::new(
                    "I'm sorry, I don't have that information to hand. If you need it, \
                     please call us back on {{relay_callback_number}}.",
                )],
            ),
            ScriptSegment::new(
                SegmentId::Closing,
                [
                    SegmentPart::new(
                        "Thank you. Just to confirm, please send the records to \
                         {{records_email}}.",
                    ),
                    SegmentPart::new(
                        " If anything comes up, you can reach the relay team on \
                         {{relay_callback_number}}.",
                    ),
                    SegmentPart::new(
                        " The receiving hospital can be reached on \
                         {{hospital_callback_number}}.",
                    ),
                    SegmentPart::new(" Goodbye."),
                ],
            ),
        ];
        Self { segments }
    }

    /// Replace one segment, keeping the rest of the script (builder pattern).
    pub fn with_segment(mut self, segment: ScriptSegment) -> Self {
        match self.segments.iter_mut().find(|s| s.id == segment.id) {
            Some(slot) => *slot = segment,
            None => self.segments.push(segment),
        }
        self
    }

    fn segment(&self, id: SegmentId) -> &ScriptSegment {
        // All five ids are present by construction.
        self.segments
            .iter()
            .find(|s| s.id == id)
            .unwrap_or_else(|| unreachable!("segment `{id}` missing from script"))
    }

    /// Render a segment against the call context.
    ///
    /// Deterministic: the same segment, context, and policy always produce
    /// identical text.
    pub fn render(&self, id: SegmentId, ctx: &CallContext) -> Result<String, CallScriptError> {
        self.render_segment(id, |name| match ContextField::from_key(name) {
            Some(field) => match ctx.field(field) {
                Some(value) => Resolution::Value(value),
                None => Resolution::Absent,
            },
            None => Resolution::Unknown,
        })
    }

    /// Render the disclosure segment for a revealed fact.
    pub fn render_disclosure(
        &self,
        key: FactKey,
        value: &str,
    ) -> Result<String, CallScriptError> {
        self.render_segment(SegmentId::Disclosure, |name| match name {
            "fact_label" => Resolution::Value(key.label()),
            "fact_value" => Resolution::Value(value),
            _ => Resolution::Unknown,
        })
    }

    /// Render the fallback segment with the callback number carried by a
    /// withheld decision.
    pub fn render_fallback(&self, callback: &str) -> Result<String, CallScriptError> {
        self.render_segment(SegmentId::Fallback, |name| match name {
            "relay_callback_number" => Resolution::Value(callback),
            _ => Resolution::Unknown,
        })
    }

    fn render_segment<'a>(
        &'a self,
        id: SegmentId,
        lookup: impl Fn(&str) -> Resolution<'a>,
    ) -> Result<String, CallScriptError> {
        let segment = self.segment(id);
        let mut out = String::new();
        for part in &segment.parts {
            match substitute(&part.text, id, &lookup)? {
                Some(rendered) => out.push_str(&rendered),
                None => debug!("segment {id}: skipping part with absent binding"),
            }
        }
        Ok(out)
    }
}

/// Substitute `{{name}}` references in one part.
///
/// Returns `Ok(None)` when any referenced binding is absent (the part is
/// dropped), `Err` when a reference names nothing the script or policy
/// knows about.
fn substitute<'a>(
    template: &str,
    segment: SegmentId,
    lookup: impl Fn(&str) -> Resolution<'a>,
) -> Result<Option<String>, CallScriptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((literal, after)) = rest.split_once("{{") {
        out.push_str(literal);
        let Some((name, tail)) = after.split_once("}}") else {
            return Err(CallScriptError::UnterminatedPlaceholder { segment });
        };
        match lookup(name.trim()) {
            Resolution::Value(value) => out.push_str(value),
            Resolution::Absent => return Ok(None),
            Resolution::Unknown => {
                return Err(CallScriptError::UnknownPlaceholder {
                    segment,
                    placeholder: name.trim().to_string(),
                });
            }
        }
        rest = tail;
    }
    out.push_str(rest);
    Ok(Some(out))
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;

    fn minimal_ctx() -> CallContext {
        CallContext::builder()
            .with_patient_name("Jane Doe")
            .with_patient_age("72")
            .with_chief_complaint("chest pain")
            .with_records_email("records_relay@treehacks.com")
            .with_relay_callback_number("123450")
            .build()
            .unwrap()
    }

    #[test]
    fn opening_includes_name_age_and_email() {
        let script = ScriptTemplate::gp_records();
        let text = script.render(SegmentId::Opening, &minimal_ctx()).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("72"));
        assert!(text.contains("records_relay@treehacks.com"));
    }

    #[test]
    fn opening_omits_absent_optional_clauses() {
        let script = ScriptTemplate::gp_records();
        let text = script.render(SegmentId::Opening, &minimal_ctx()).unwrap();
        // No gender or address was supplied: neither rendered values nor
        // raw placeholder text may leak into the utterance.
        assert!(!text.contains("patient_gender"));
        assert!(!text.contains("{{"));
        assert!(!text.contains("}}"));
    }

    #[test]
    fn closing_skips_hospital_callback_when_absent() {
        let script = ScriptTemplate::gp_records();
        let text = script.render(SegmentId::Closing, &minimal_ctx()).unwrap();
        assert!(text.contains("records_relay@treehacks.com"));
        assert!(text.contains("123450"));
        assert!(!text.contains("hospital"));
        assert!(text.ends_with("Goodbye."));
    }

    #[test]
    fn closing_includes_hospital_callback_when_present() {
        let ctx = CallContext::builder()
            .with_patient_name("Jane Doe")
            .with_chief_complaint("chest pain")
            .with_records_email("records_relay@treehacks.com")
            .with_relay_callback_number("123450")
            .with_hospital_callback_number("+1-555-0100")
            .build()
            .unwrap();
        let script = ScriptTemplate::gp_records();
        let text = script.render(SegmentId::Closing, &ctx).unwrap();
        assert!(text.contains("+1-555-0100"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let script = ScriptTemplate::gp_records();
        let ctx = minimal_ctx();
        let first = script.render(SegmentId::Opening, &ctx).unwrap();
        let second = script.render(SegmentId::Opening, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_placeholder_is_an_authoring_error() {
        let script = ScriptTemplate::gp_records().with_segment(ScriptSegment::new(
            SegmentId::Opening,
            [SegmentPart::new("Calling about {{patient_blood_type}}.")],
        ));
        let err = script.render(SegmentId::Opening, &minimal_ctx()).unwrap_err();
        match err {
            CallScriptError::UnknownPlaceholder {
                segment,
                placeholder,
            } => {
                assert_eq!(segment, SegmentId::Opening);
                assert_eq!(placeholder, "patient_blood_type");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_placeholder_is_an_authoring_error() {
        let script = ScriptTemplate::gp_records().with_segment(ScriptSegment::new(
            SegmentId::Fallback,
            [SegmentPart::new("Call {{relay_callback_number")],
        ));
        let err = script.render_fallback("123450").unwrap_err();
        assert!(matches!(
            err,
            CallScriptError::UnterminatedPlaceholder {
                segment: SegmentId::Fallback
            }
        ));
    }

    #[test]
    fn fallback_substitutes_carried_callback() {
        let script = ScriptTemplate::gp_records();
        let text = script.render_fallback("123450").unwrap();
        assert!(text.contains("123450"));
        assert!(text.contains("don't have that information"));
    }

    #[test]
    fn disclosure_uses_fact_label_and_value() {
        let script = ScriptTemplate::gp_records();
        let text = script.render_disclosure(FactKey::PatientAge, "72").unwrap();
        assert!(text.contains("age"));
        assert!(text.contains("72"));
    }
}
