//! Keyword-based question classification.
//!
//! Reducing an arbitrary spoken question to a canonical fact key is the job
//! of the excluded speech-understanding platform. This module is the
//! explicit stub for that boundary: a fixed keyword table good enough for
//! the CLI host and for tests. Hosts with real language understanding
//! should construct [`FactRequest`]s directly and skip this entirely.
//!
//! Question phrases are checked before agreement phrases, so a turn like
//! "Sure, but what's the address?" classifies as a question.

use crate::policy::{FactKey, FactRequest};

/// What a counterpart utterance meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A question about one enumerated fact.
    Question(FactRequest),
    /// Agreement to send the records.
    Agreement,
    /// Nothing the table recognizes. The host should still answer through
    /// the policy (which withholds unrecognized requests) rather than
    /// dropping the turn.
    Unclassified,
}

/// Fact keys and the phrases that select them, checked in order.
/// More specific multi-word phrases come before generic single words.
const QUESTION_PHRASES: &[(FactKey, &[&str])] = &[
    (
        FactKey::HospitalDestination,
        &[
            "which hospital",
            "what hospital",
            "where are you taking",
            "where are they going",
            "destination",
        ],
    ),
    (
        FactKey::Eta,
        &["eta", "when will", "how long until", "arriv"],
    ),
    (
        FactKey::PatientDob,
        &["date of birth", "dob", "when was", "born"],
    ),
    (FactKey::PatientAge, &["how old", "age"]),
    (
        FactKey::PatientGender,
        &["gender", "male or female", "sex"],
    ),
    (
        FactKey::PatientAddress,
        &["address", "where do they live", "postcode"],
    ),
    (
        FactKey::TransportReason,
        &["why", "reason", "what happened", "what's wrong"],
    ),
    (
        FactKey::CaseId,
        &["case number", "case id", "reference number"],
    ),
    (FactKey::PatientName, &["name", "spell"]),
];

const AGREEMENT_PHRASES: &[&str] = &[
    "yes",
    "sure",
    "of course",
    "no problem",
    "will send",
    "we'll send",
    "i'll send",
    "right away",
    "we can do that",
    "happy to",
];

/// Fixed-table classifier for counterpart utterances.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one utterance. Deterministic: table order decides ties.
    pub fn classify(&self, utterance: &str) -> Classification {
        let lower = utterance.to_lowercase();

        for (key, phrases) in QUESTION_PHRASES {
            if phrases.iter().any(|phrase| lower.contains(phrase)) {
                return Classification::Question(FactRequest::for_key(*key));
            }
        }

        if AGREEMENT_PHRASES
            .iter()
            .any(|phrase| lower.contains(phrase))
        {
            return Classification::Agreement;
        }

        Classification::Unclassified
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(utterance: &str) -> Classification {
        KeywordClassifier::new().classify(utterance)
    }

    fn expect_question(utterance: &str, key: FactKey) {
        assert_eq!(
            classify(utterance),
            Classification::Question(FactRequest::for_key(key)),
            "utterance: {utterance}"
        );
    }

    #[test]
    fn common_questions_map_to_fact_keys() {
        expect_question("How old is the patient?", FactKey::PatientAge);
        expect_question("What's their home address?", FactKey::PatientAddress);
        expect_question("Which hospital are they going to?", FactKey::HospitalDestination);
        expect_question("When will the patient arrive?", FactKey::Eta);
        expect_question("Do you have a date of birth?", FactKey::PatientDob);
        expect_question("Why are they being transported?", FactKey::TransportReason);
        expect_question("Can you spell that for me?", FactKey::PatientName);
        expect_question("What's the case number?", FactKey::CaseId);
    }

    #[test]
    fn agreement_phrases_are_detected() {
        assert_eq!(classify("Sure, we'll send them over."), Classification::Agreement);
        assert_eq!(classify("Yes, no problem."), Classification::Agreement);
    }

    #[test]
    fn question_wins_over_agreement_in_same_turn() {
        expect_question("Sure, but what's the address?", FactKey::PatientAddress);
    }

    #[test]
    fn unknown_utterances_are_unclassified() {
        assert_eq!(
            classify("Hold on, let me get the receptionist."),
            Classification::Unclassified
        );
    }
}
