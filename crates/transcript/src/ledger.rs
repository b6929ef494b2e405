use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::{AttributionRecord, Speaker, TranscriptSnapshot, Utterance};

/// Outcome of [`UtteranceLedger::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// The commit carried a lower watermark than one already applied — a
    /// slow, older classification lost the race to a newer one and was
    /// dropped. Not an error.
    StaleDropped,
}

/// Append-only ordered store of raw utterances, plus the watermark of how
/// many leading utterances are covered by the latest authoritative
/// classification.
///
/// Appends happen on the fragment-arrival path while the scheduler
/// concurrently reads lengths and commits classification results, so all
/// state lives behind one mutex. Critical sections are short; nothing holds
/// the lock across an await point.
pub struct UtteranceLedger {
    inner: Mutex<Inner>,
}

struct Inner {
    utterances: Vec<Utterance>,
    classified: Vec<AttributionRecord>,
    watermark: usize,
    frozen: bool,
}

impl UtteranceLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                utterances: Vec::new(),
                classified: Vec::new(),
                watermark: 0,
                frozen: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one utterance. Returns its sequence index, or `None` for
    /// blank/whitespace-only text or after [`UtteranceLedger::freeze`].
    pub fn append(&self, text: &str) -> Option<usize> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut inner = self.lock();
        if inner.frozen {
            return None;
        }

        let index = inner.utterances.len();
        inner.utterances.push(Utterance {
            index,
            text: text.to_string(),
        });
        Some(index)
    }

    pub fn len(&self) -> usize {
        self.lock().utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().utterances.is_empty()
    }

    pub fn watermark(&self) -> usize {
        self.lock().watermark
    }

    pub fn unclassified_count(&self) -> usize {
        let inner = self.lock();
        inner.utterances.len() - inner.watermark
    }

    /// All utterance texts in arrival order — the full corpus sent to the
    /// classifier on every request.
    pub fn all_texts(&self) -> Vec<String> {
        self.lock()
            .utterances
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }

    /// The current classified prefix, passed to the classifier as context
    /// hints on subsequent requests.
    pub fn classified_records(&self) -> Vec<AttributionRecord> {
        self.lock().classified.clone()
    }

    /// Atomically replace the entire classified prefix.
    ///
    /// `watermark_at_request` is the ledger length captured when the
    /// classification request was dispatched. Last-writer-by-watermark wins:
    /// a commit with a lower watermark than the stored one reflects a
    /// classification of less input than one already applied and is dropped.
    /// Records carrying [`Speaker::Pending`] are discarded — the pending
    /// state is synthesized locally, never accepted from a classifier.
    pub fn commit(
        &self,
        watermark_at_request: usize,
        records: Vec<AttributionRecord>,
    ) -> CommitOutcome {
        let mut inner = self.lock();
        if watermark_at_request < inner.watermark {
            return CommitOutcome::StaleDropped;
        }

        inner.classified = records
            .into_iter()
            .filter(|r| !r.speaker.is_pending())
            .collect();
        inner.watermark = watermark_at_request.min(inner.utterances.len());
        CommitOutcome::Applied
    }

    /// Stop accepting appends. Called at recording stop, before the final
    /// flush classification.
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    /// Project the best currently-known transcript view: the classified
    /// prefix as of the last commit, plus one synthetic pending record
    /// wrapping all utterances past the watermark.
    ///
    /// Pure projection, no mutation. Safe to call at any time, including
    /// mid-classification.
    pub fn project(&self) -> TranscriptSnapshot {
        let inner = self.lock();
        let mut records = inner.classified.clone();

        let pending: Vec<&str> = inner.utterances[inner.watermark..]
            .iter()
            .map(|u| u.text.as_str())
            .collect();
        if !pending.is_empty() {
            records.push(AttributionRecord::new(Speaker::Pending, pending.join(" ")));
        }

        TranscriptSnapshot { records }
    }
}

impl Default for UtteranceLedger {
    fn default() -> Self {
        Self::new()
    }
}
