use std::future::Future;
use std::pin::Pin;

use crate::types::AttributionRecord;

pub type ClassifyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async speaker-attribution contract.
///
/// An implementation receives the full ledger of utterance texts in arrival
/// order plus the previously classified records as context hints, and returns
/// a complete re-segmentation of the input — the result replaces the entire
/// classified prefix, it is never merged per utterance. The classifier may
/// re-split or re-merge utterances freely; returned text is authoritative
/// even when it only approximately covers the submitted input.
///
/// Callers must tolerate empty results and outright failure. A failed call
/// is recovered by the scheduler (retried on the next trigger), never fatal.
///
/// # Object safety
///
/// The trait is object-safe via the explicit `BoxFuture` return type. Use
/// `dyn SpeakerClassifier` when you need dynamic dispatch.
pub trait SpeakerClassifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        utterances: &'a [String],
        context: &'a [AttributionRecord],
    ) -> BoxFuture<'a, Result<Vec<AttributionRecord>, ClassifyError>>;
}
