//! Character-level typewriter rendering for live-updating text fields.
//!
//! Upstream produces successive full-text versions of a display field; this
//! crate turns each version change into an erase-then-type animation over
//! the char-level common prefix, so corrections read as a human retyping
//! instead of the whole field flashing. Targets arriving faster than the
//! animation are coalesced per slot: the animation always converges on the
//! latest target, never replaying intermediate ones.

mod board;
mod diff;
mod driver;
mod normalize;

pub use board::{Board, Step, Submission};
pub use diff::{TypingPlan, common_prefix_chars, plan};
pub use driver::{DisplaySink, Typewriter, TypewriterConfig};
pub use normalize::normalize;
