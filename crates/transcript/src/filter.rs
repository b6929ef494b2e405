use regex::Regex;

/// Patterns ASR providers emit on silence or trailing audio — broadcast
/// sign-offs, subtitle credits, bracketed non-speech cues. Matched and
/// removed in order before a fragment reaches the ledger.
const BOILERPLATE: &[&str] = &[
    r"(?i)thank you for watching[.!]?",
    r"(?i)thanks for watching[.!]?",
    r"(?i)please\s+(?:like\s+and\s+)?subscribe[.!]?",
    r"시청해\s*주셔서\s*감사합니다[.!]?",
    r"구독과\s*좋아요(?:\s*부탁드립니다)?[.!]?",
    r"다음\s*영상에서\s*만나요[.!]?",
    r"자막\s*(?:제공|by)\s*\S*",
    r"[\[(](?:음악|박수|웃음)[\])]",
    r"(?i)[\[(](?:music|applause|laughter)[\])]",
];

/// Removes provider-side recognition artifacts from raw final-transcript
/// fragments.
///
/// Pure and total: never fails, worst case returns an empty string — and an
/// empty result means "discard this fragment, do not append to the ledger."
pub struct FragmentFilter {
    patterns: Vec<Regex>,
}

impl FragmentFilter {
    pub fn new() -> Self {
        let patterns = BOILERPLATE
            .iter()
            .map(|p| Regex::new(p).expect("static boilerplate pattern must compile"))
            .collect();
        Self { patterns }
    }

    pub fn filter(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for pattern in &self.patterns {
            text = pattern.replace_all(&text, " ").into_owned();
        }
        collapse_whitespace(&text)
    }
}

impl Default for FragmentFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
