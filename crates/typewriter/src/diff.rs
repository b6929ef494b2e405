/// Length in chars of the longest common prefix of two strings.
///
/// Char-based, not byte-based: erase/type steps operate on whole chars, and
/// Hangul syllables are multi-byte.
pub fn common_prefix_chars(old: &str, new: &str) -> usize {
    old.chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count()
}

/// The minimal erase-then-type edit taking `old` to `new`: keep the common
/// prefix, erase everything after it, type the new suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingPlan {
    pub erase: usize,
    pub type_suffix: String,
}

pub fn plan(old: &str, new: &str) -> TypingPlan {
    let keep = common_prefix_chars(old, new);
    TypingPlan {
        erase: old.chars().count() - keep,
        type_suffix: new.chars().skip(keep).collect(),
    }
}

impl TypingPlan {
    /// Total chars touched; below the animation threshold the edit is
    /// applied in a single render instead.
    pub fn changed_chars(&self) -> usize {
        self.erase + self.type_suffix.chars().count()
    }

    pub fn is_noop(&self) -> bool {
        self.erase == 0 && self.type_suffix.is_empty()
    }
}
