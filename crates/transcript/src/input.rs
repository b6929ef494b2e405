/// One event from the speech transport.
///
/// The transport delivers an ordered sequence of these per open session;
/// only `is_final == true` events become candidate utterances (interim
/// hypotheses are display-only upstream and never enter the ledger).
/// Session open/close, audio encoding, and reconnection live entirely in
/// the transport.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct StreamFragment {
    pub text: String,
    pub is_final: bool,
}

impl StreamFragment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn into_final_text(self) -> Option<String> {
        self.is_final.then_some(self.text)
    }
}
