//! Minimal end-to-end call, from context to audited transcript.
//!
//! Builds a call context, runs a short scripted exchange with a GP
//! receptionist, and prints the resulting transcript.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example scripted_call
//! ```

use callscript::prelude::*;
use std::sync::Arc;

fn main() -> Result<(), CallScriptError> {
    // 1. Shared engine: stock GP script plus the disclosure policy.
    let engine = Arc::new(ScriptEngine::gp_records());

    // 2. Per-call context. Age is known; address is not.
    let context = CallContext::builder()
        .with_patient_name("Jane Doe")
        .with_patient_age("72")
        .with_chief_complaint("chest pain")
        .with_records_email(callscript::DEFAULT_RECORDS_EMAIL)
        .with_relay_callback_number(callscript::DEFAULT_RELAY_CALLBACK_NUMBER)
        .build()?;

    let mut call = engine.start_call(context).with_observer(LoggingObserver);

    // 3. Agent-initiated turns.
    call.open()?;
    call.request_records()?;

    // 4. The GP asks questions; the policy decides what to reveal.
    let classifier = KeywordClassifier::new();
    for line in [
        "How old is the patient?",
        "What's their home address?",
        "Alright, we'll send the records over now.",
    ] {
        let turn = match classifier.classify(line) {
            Classification::Question(request) => CounterpartTurn::question(line, request),
            Classification::Agreement => CounterpartTurn::agreement(line),
            Classification::Unclassified => {
                CounterpartTurn::question(line, FactRequest::new("unclassified"))
            }
        };
        call.handle(turn)?;
    }

    // 5. Print the audit transcript.
    for entry in call.transcript().entries() {
        let speaker = match entry.speaker {
            Speaker::Agent => "agent",
            Speaker::Counterpart => "gp",
        };
        println!("[{}] {speaker}> {}", entry.turn, entry.text);
    }

    Ok(())
}
