//! End-to-end call flows through the public API.

use callscript::prelude::*;
use std::sync::Arc;

fn engine() -> Arc<ScriptEngine> {
    Arc::new(ScriptEngine::gp_records())
}

/// The Jane Doe context: age known, everything else optional absent.
fn jane_doe() -> CallContext {
    CallContext::builder()
        .with_patient_name("Jane Doe")
        .with_patient_age("72")
        .with_chief_complaint("chest pain")
        .with_records_email("records_relay@treehacks.com")
        .with_relay_callback_number("123450")
        .build()
        .unwrap()
}

fn minimal() -> CallContext {
    CallContext::builder()
        .with_patient_name("Jane Doe")
        .with_chief_complaint("chest pain")
        .with_records_email("records_relay@treehacks.com")
        .with_relay_callback_number("123450")
        .build()
        .unwrap()
}

fn opened(context: CallContext) -> CallSession {
    let mut call = engine().start_call(context);
    call.open().unwrap();
    call.request_records().unwrap();
    call
}

#[test]
fn opening_discloses_known_fields_only() {
    let mut call = engine().start_call(jane_doe());
    let opening = call.open().unwrap();

    assert!(opening.text.contains("Jane Doe"));
    assert!(opening.text.contains("72"));
    assert!(opening.text.contains("records_relay@treehacks.com"));
    // Absent gender and address leave no trace, rendered or raw.
    assert!(!opening.text.contains("gender"));
    assert!(!opening.text.contains("address"));
    assert!(!opening.text.contains("{{"));
}

#[test]
fn absent_address_yields_the_fallback_utterance() {
    let mut call = opened(jane_doe());
    let answer = call
        .handle(CounterpartTurn::question(
            "What's the patient's address?",
            FactRequest::for_key(FactKey::PatientAddress),
        ))
        .unwrap();

    // Exactly the fallback template with the relay number substituted.
    let expected = engine().template().render_fallback("123450").unwrap();
    assert_eq!(answer.text, expected);
    assert_eq!(answer.state, CallState::Clarification);
}

#[test]
fn unrecognized_fact_keys_are_withheld_not_errors() {
    let mut call = opened(jane_doe());
    for key in ["insurance_provider", "nhs_number"] {
        let answer = call
            .handle(CounterpartTurn::question(
                "An unrecognized question.",
                FactRequest::new(key),
            ))
            .unwrap();
        assert!(answer.text.contains("123450"), "key {key} must fall back");
        assert_eq!(answer.state, CallState::Clarification);
    }
}

#[test]
fn every_absent_fact_falls_back_with_the_relay_number() {
    let mut call = opened(minimal());
    for key in [
        FactKey::HospitalDestination,
        FactKey::Eta,
        FactKey::PatientAge,
        FactKey::PatientGender,
        FactKey::PatientAddress,
        FactKey::PatientDob,
        FactKey::CaseId,
    ] {
        let answer = call
            .handle(CounterpartTurn::question(
                "A question about something we don't have.",
                FactRequest::for_key(key),
            ))
            .unwrap();
        assert!(
            answer.text.contains("123450"),
            "fallback for {key} must include the relay callback number"
        );
    }
}

#[test]
fn agreement_during_clarification_closes_with_the_email() {
    let mut call = opened(jane_doe());
    call.handle(CounterpartTurn::question(
        "How old is the patient?",
        FactRequest::for_key(FactKey::PatientAge),
    ))
    .unwrap();

    let closing = call
        .handle(CounterpartTurn::agreement("Yes, we'll email them now."))
        .unwrap();
    assert_eq!(closing.state, CallState::Ended);
    assert!(closing.text.contains("records_relay@treehacks.com"));

    let transcript = call.into_transcript();
    let closings = transcript
        .entries()
        .iter()
        .filter(|e| e.segment == Some(SegmentId::Closing))
        .count();
    assert_eq!(closings, 1);
}

#[test]
fn completed_call_transcript_is_well_ordered() {
    let mut call = opened(jane_doe());
    call.handle(CounterpartTurn::question(
        "Why is she being transported?",
        FactRequest::for_key(FactKey::TransportReason),
    ))
    .unwrap();
    call.handle(CounterpartTurn::agreement("Of course."))
        .unwrap();

    let transcript = call.into_transcript();
    let entries = transcript.entries();

    assert_eq!(entries[0].segment, Some(SegmentId::Opening));
    assert_eq!(entries.last().unwrap().segment, Some(SegmentId::Closing));

    let records_requests = entries
        .iter()
        .filter(|e| e.segment == Some(SegmentId::RecordsRequest))
        .count();
    assert_eq!(records_requests, 1);

    let turns: Vec<u32> = entries.iter().map(|e| e.turn).collect();
    let expected: Vec<u32> = (0..entries.len() as u32).collect();
    assert_eq!(turns, expected);
}

#[test]
fn identical_calls_resolve_identical_utterances() {
    let run = || {
        let mut call = opened(jane_doe());
        call.handle(CounterpartTurn::question(
            "How old is the patient?",
            FactRequest::for_key(FactKey::PatientAge),
        ))
        .unwrap();
        call.handle(CounterpartTurn::agreement("Sure."))
            .unwrap();
        call.into_transcript()
            .entries()
            .iter()
            .map(|e| e.text.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn classifier_driven_call_end_to_end() {
    let classifier = KeywordClassifier::new();
    let mut call = opened(jane_doe());

    for line in [
        "How old is the patient?",
        "And which hospital is she going to?",
        "Fine, we'll send everything right away.",
    ] {
        let turn = match classifier.classify(line) {
            Classification::Question(request) => CounterpartTurn::question(line, request),
            Classification::Agreement => CounterpartTurn::agreement(line),
            Classification::Unclassified => {
                CounterpartTurn::question(line, FactRequest::new("unclassified"))
            }
        };
        call.handle(turn).unwrap();
    }

    assert_eq!(call.state(), CallState::Ended);
    let transcript = call.into_transcript();

    // Age was known and disclosed; the destination was withheld.
    let agent_texts: Vec<&str> = transcript
        .by_speaker(Speaker::Agent)
        .map(|e| e.text.as_str())
        .collect();
    assert!(agent_texts.iter().any(|t| t.contains("72")));
    assert!(agent_texts.iter().any(|t| t.contains("123450")));
}

#[test]
fn transcript_audit_export_roundtrips_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.json");

    let mut call = opened(jane_doe());
    call.handle(CounterpartTurn::agreement("Will do."))
        .unwrap();
    call.transcript().save_json(&path).unwrap();

    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"opening\""));
    assert!(json.contains("\"closing\""));
    assert!(json.contains("Jane Doe"));
}
