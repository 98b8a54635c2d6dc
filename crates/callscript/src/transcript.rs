//! Append-only call transcript, for post-call audit and as the test oracle.
//!
//! [`Transcript::append`] is the only mutator. Turn indices start at 0 and
//! increase by one per entry; ordering is call-chronological and entries are
//! never reordered or edited after append. Agent entries record the script
//! segment they were rendered from, which is what audit checks key on.

use crate::error::CallScriptError;
use crate::script::SegmentId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Who produced an utterance.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The automated caller.
    Agent,
    /// The GP practice on the other end of the line.
    Counterpart,
}

/// One resolved utterance.
#[derive(Serialize, Debug, Clone)]
pub struct TranscriptEntry {
    /// Monotonic turn index, starting at 0.
    pub turn: u32,
    pub speaker: Speaker,
    /// The script segment an agent utterance was rendered from.
    /// `None` for counterpart utterances.
    pub segment: Option<SegmentId>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// The full ordered record of one call.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one resolved utterance. The turn index is assigned here so
    /// indices are monotonic by construction.
    pub fn append(
        &mut self,
        speaker: Speaker,
        segment: Option<SegmentId>,
        text: impl Into<String>,
    ) -> &TranscriptEntry {
        let entry = TranscriptEntry {
            turn: self.entries.len() as u32,
            speaker,
            segment,
            text: text.into(),
            timestamp: Utc::now(),
        };
        self.entries.push(entry);
        // Just pushed, so the vec is non-empty.
        self.entries.last().unwrap_or_else(|| unreachable!())
    }

    /// The full ordered sequence.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries produced by one speaker, in order.
    pub fn by_speaker(&self, speaker: Speaker) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter().filter(move |e| e.speaker == speaker)
    }

    /// Atomic audit export: serialize to a temp file, then rename into place.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CallScriptError> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
