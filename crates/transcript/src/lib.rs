pub mod classify;
pub mod filter;
pub mod input;
pub mod ledger;
pub mod types;

pub use classify::{BoxFuture, ClassifyError, SpeakerClassifier};
pub use filter::FragmentFilter;
pub use input::StreamFragment;
pub use ledger::{CommitOutcome, UtteranceLedger};
pub use types::{AttributionRecord, Speaker, TranscriptSnapshot, Utterance};
