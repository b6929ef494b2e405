#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Doctor,
    Patient,
    /// Synthesized locally for utterances past the classification watermark.
    /// Never produced by the classifier.
    Pending,
}

impl Speaker {
    pub fn is_pending(&self) -> bool {
        matches!(self, Speaker::Pending)
    }
}

/// One finalized unit of recognized speech, in arrival order.
///
/// Immutable once appended; `index` is assignment order, zero-based, never
/// reused. Owned exclusively by [`crate::ledger::UtteranceLedger`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct Utterance {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct AttributionRecord {
    pub speaker: Speaker,
    pub text: String,
}

impl AttributionRecord {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Complete snapshot of the attributed transcript at a point in time.
///
/// This is the rendering contract: everything a display layer needs to draw
/// one frame. The record list is always `classified prefix ++ pending
/// suffix`, where the prefix is the most recent authoritative classifier
/// output (replaced wholesale on every commit, never patched per utterance)
/// and the suffix is at most one [`Speaker::Pending`] record wrapping all
/// not-yet-classified raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TranscriptSnapshot {
    pub records: Vec<AttributionRecord>,
}

impl TranscriptSnapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The classified prefix, excluding any trailing pending record.
    pub fn classified(&self) -> &[AttributionRecord] {
        match self.records.last() {
            Some(last) if last.speaker.is_pending() => &self.records[..self.records.len() - 1],
            _ => &self.records,
        }
    }

    /// Raw text of the pending suffix, if any utterances are unclassified.
    pub fn pending_text(&self) -> Option<&str> {
        self.records
            .last()
            .filter(|r| r.speaker.is_pending())
            .map(|r| r.text.as_str())
    }

    /// Flatten all record texts into one string, for single-field rendering.
    pub fn text(&self) -> String {
        self.records
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
