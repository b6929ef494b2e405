use std::collections::{HashMap, VecDeque};

use crate::diff;
use crate::normalize::normalize;

/// How a submitted target was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Already displayed (after normalization); nothing to do.
    Noop,
    /// The target is shorter (in chars) than the slot's last accepted
    /// target. Upstream text only ever grows or gets re-attributed, so a
    /// shorter version is transient partial output and is dropped rather
    /// than letting the field visibly shrink then regrow. `reset` is the
    /// escape hatch when a genuine shrink is wanted.
    ShrinkIgnored,
    /// Change too small to animate; the carried text is rendered in one
    /// frame by the caller.
    Instant(String),
    /// Slot enqueued for animation.
    Queued,
    /// Slot was already queued or animating; only its target moved. The
    /// running animation converges on the new target without replaying
    /// intermediate versions.
    Retargeted,
}

/// One animation step, produced under the board lock and rendered outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One char erased from the tail; render the carried text.
    Erase(String),
    /// One char appended; render the carried text.
    Type(String),
    /// Displayed text equals the target; the slot leaves the active state.
    Done,
}

#[derive(Debug, Default)]
struct Slot {
    displayed: String,
    target: String,
}

/// Pure animation state for all display slots: what each slot currently
/// shows, what it should converge to, and which slots await animation.
///
/// Owns no tasks and no clock. The driver calls [`Board::tick`] once per
/// interval; every tick re-reads the slot's latest target, which is what
/// makes mid-animation retargeting free.
#[derive(Debug, Default)]
pub struct Board {
    slots: HashMap<String, Slot>,
    queue: VecDeque<String>,
    active: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a new target for `slot_id`. `min_animated_change` is the
    /// changed-char count below which the edit is applied in one render.
    pub fn submit(
        &mut self,
        slot_id: &str,
        raw_target: &str,
        min_animated_change: usize,
    ) -> Submission {
        let target = normalize(raw_target);
        let pending = self.is_pending(slot_id);
        let slot = self.slots.entry(slot_id.to_string()).or_default();

        if target == slot.target && (pending || target == slot.displayed) {
            return Submission::Noop;
        }
        if target.chars().count() < slot.target.chars().count() {
            return Submission::ShrinkIgnored;
        }

        slot.target = target;

        if pending {
            return Submission::Retargeted;
        }

        let plan = diff::plan(&slot.displayed, &slot.target);
        if plan.is_noop() {
            return Submission::Noop;
        }
        if plan.changed_chars() < min_animated_change {
            slot.displayed = slot.target.clone();
            return Submission::Instant(slot.displayed.clone());
        }

        self.queue.push_back(slot_id.to_string());
        Submission::Queued
    }

    /// Pop the next slot owed an animation and mark it active.
    pub fn next_slot(&mut self) -> Option<String> {
        let slot_id = self.queue.pop_front()?;
        self.active = Some(slot_id.clone());
        Some(slot_id)
    }

    /// Advance the active slot's animation by one char.
    pub fn tick(&mut self, slot_id: &str) -> Step {
        let Some(slot) = self.slots.get_mut(slot_id) else {
            self.active = None;
            return Step::Done;
        };

        let keep = diff::common_prefix_chars(&slot.displayed, &slot.target);
        let shown = slot.displayed.chars().count();

        if shown > keep {
            slot.displayed = slot.displayed.chars().take(shown - 1).collect();
            Step::Erase(slot.displayed.clone())
        } else if slot.displayed == slot.target {
            self.active = None;
            Step::Done
        } else {
            // displayed is a proper prefix of target here
            match slot.target.chars().nth(shown) {
                Some(next) => {
                    slot.displayed.push(next);
                    Step::Type(slot.displayed.clone())
                }
                None => {
                    self.active = None;
                    Step::Done
                }
            }
        }
    }

    /// Forget everything about a slot: displayed text, target, queue entry.
    /// The next submission for it types from an empty field.
    pub fn reset(&mut self, slot_id: &str) {
        self.slots.remove(slot_id);
        self.queue.retain(|id| id != slot_id);
        if self.active.as_deref() == Some(slot_id) {
            self.active = None;
        }
    }

    pub fn displayed(&self, slot_id: &str) -> Option<&str> {
        self.slots.get(slot_id).map(|s| s.displayed.as_str())
    }

    fn is_pending(&self, slot_id: &str) -> bool {
        self.active.as_deref() == Some(slot_id) || self.queue.iter().any(|id| id == slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANIMATE_ALL: usize = 1;

    /// Drive one slot's animation to completion, collecting rendered texts.
    fn run_to_done(board: &mut Board) -> Vec<String> {
        let slot = board.next_slot().expect("a slot should be queued");
        let mut renders = Vec::new();
        loop {
            match board.tick(&slot) {
                Step::Erase(text) | Step::Type(text) => renders.push(text),
                Step::Done => return renders,
            }
        }
    }

    #[test]
    fn types_initial_target_char_by_char() {
        let mut board = Board::new();
        assert_eq!(board.submit("note", "안녕", ANIMATE_ALL), Submission::Queued);

        let renders = run_to_done(&mut board);
        assert_eq!(renders, ["안", "안녕"]);
        assert_eq!(board.displayed("note"), Some("안녕"));
    }

    #[test]
    fn correction_erases_to_common_prefix_then_types() {
        let mut board = Board::new();
        board.submit("note", "안녕하세", ANIMATE_ALL);
        run_to_done(&mut board);

        assert_eq!(
            board.submit("note", "안녕하십니까", ANIMATE_ALL),
            Submission::Queued
        );
        let renders = run_to_done(&mut board);
        assert_eq!(renders, ["안녕하", "안녕하십", "안녕하십니", "안녕하십니까"]);
    }

    #[test]
    fn rapid_retargets_converge_on_latest_only() {
        let mut board = Board::new();
        assert_eq!(board.submit("note", "가나", ANIMATE_ALL), Submission::Queued);
        assert_eq!(
            board.submit("note", "가나다", ANIMATE_ALL),
            Submission::Retargeted
        );
        assert_eq!(
            board.submit("note", "가나다라", ANIMATE_ALL),
            Submission::Retargeted
        );

        let renders = run_to_done(&mut board);
        assert_eq!(renders.last().map(String::as_str), Some("가나다라"));
        // the superseded targets are never a stopping point
        assert!(board.next_slot().is_none());
    }

    #[test]
    fn retarget_mid_erase_redirects_without_finishing_old_edit() {
        let mut board = Board::new();
        board.submit("note", "가나다라", ANIMATE_ALL);
        run_to_done(&mut board);

        board.submit("note", "가나ABCD", ANIMATE_ALL);
        let slot = board.next_slot().unwrap();
        // one erase step, then the target moves again
        assert_eq!(board.tick(&slot), Step::Erase("가나다".into()));
        assert_eq!(
            board.submit("note", "가나다돈까스", ANIMATE_ALL),
            Submission::Retargeted
        );

        // the erase stops where the new common prefix starts
        assert_eq!(board.tick(&slot), Step::Type("가나다돈".into()));
        assert_eq!(board.tick(&slot), Step::Type("가나다돈까".into()));
        assert_eq!(board.tick(&slot), Step::Type("가나다돈까스".into()));
        assert_eq!(board.tick(&slot), Step::Done);
    }

    #[test]
    fn small_change_applies_instantly() {
        let mut board = Board::new();
        // 4 changed chars, threshold 5
        assert_eq!(
            board.submit("note", "안녕하세", 5),
            Submission::Instant("안녕하세".into())
        );
        assert!(board.next_slot().is_none());
        assert_eq!(board.displayed("note"), Some("안녕하세"));
    }

    #[test]
    fn resubmitting_displayed_text_is_noop() {
        let mut board = Board::new();
        board.submit("note", "안녕", ANIMATE_ALL);
        run_to_done(&mut board);

        assert_eq!(board.submit("note", "안녕", ANIMATE_ALL), Submission::Noop);
        assert_eq!(board.submit("note", " 안녕 ", ANIMATE_ALL), Submission::Noop);
    }

    #[test]
    fn shorter_target_is_ignored() {
        let mut board = Board::new();
        board.submit("note", "안녕하십니까", ANIMATE_ALL);
        run_to_done(&mut board);

        assert_eq!(
            board.submit("note", "안녕하", ANIMATE_ALL),
            Submission::ShrinkIgnored
        );
        // even a non-prefix shorter replacement is dropped
        assert_eq!(
            board.submit("note", "다른 말", ANIMATE_ALL),
            Submission::ShrinkIgnored
        );
        assert_eq!(board.displayed("note"), Some("안녕하십니까"));
    }

    #[test]
    fn reset_allows_genuine_shrink() {
        let mut board = Board::new();
        board.submit("note", "안녕하십니까", ANIMATE_ALL);
        run_to_done(&mut board);

        board.reset("note");
        assert_eq!(board.submit("note", "안녕하", ANIMATE_ALL), Submission::Queued);
        let renders = run_to_done(&mut board);
        assert_eq!(renders, ["안", "안녕", "안녕하"]);
    }

    #[test]
    fn slots_animate_independently_in_queue_order() {
        let mut board = Board::new();
        board.submit("doctor", "네", ANIMATE_ALL);
        board.submit("patient", "아니요", ANIMATE_ALL);

        assert_eq!(board.next_slot().as_deref(), Some("doctor"));
        loop {
            if board.tick("doctor") == Step::Done {
                break;
            }
        }
        assert_eq!(board.next_slot().as_deref(), Some("patient"));
    }

    #[test]
    fn normalized_equivalent_target_does_not_reanimate() {
        let mut board = Board::new();
        board.submit("note", "네 알겠습니다", ANIMATE_ALL);
        run_to_done(&mut board);

        assert_eq!(
            board.submit("note", "네 알겠어요", ANIMATE_ALL),
            Submission::Noop
        );
    }
}
