use scriba_transcript::TranscriptSnapshot;

#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A new best-known transcript view: emitted on every accepted append
    /// (pending suffix grew) and on every applied classification commit
    /// (classified prefix replaced).
    #[serde(rename = "transcriptUpdated")]
    TranscriptUpdated {
        session_id: String,
        snapshot: TranscriptSnapshot,
    },

    /// A classification call failed. Recovered locally — the scheduler
    /// retries on the next trigger; appends are unaffected.
    #[serde(rename = "classificationFailed")]
    ClassificationFailed { session_id: String, error: String },

    /// The terminal snapshot after flush. No further events follow.
    #[serde(rename = "flushed")]
    Flushed {
        session_id: String,
        snapshot: TranscriptSnapshot,
    },
}
