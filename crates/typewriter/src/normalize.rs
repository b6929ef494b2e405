/// Surface-form equivalences: spelling variants the upstream classifier
/// flips between without the content changing. Each right-hand side must
/// not contain any left-hand side, so one rewrite pass is a fixed point.
const EQUIVALENTS: &[(&str, &str)] = &[
    ("알겠어요", "알겠습니다"),
    ("고마워요", "고맙습니다"),
    ("괜찮아요", "괜찮습니다"),
    ("감사해요", "감사합니다"),
];

/// Canonicalize a display target before diffing: collapse whitespace runs
/// and map spelling variants to one form. Idempotent — submitting an
/// already-normalized string changes nothing, so equal content never
/// triggers an animation.
pub fn normalize(text: &str) -> String {
    let mut out = text.split_whitespace().collect::<Vec<_>>().join(" ");
    for (variant, canonical) in EQUIVALENTS {
        if out.contains(variant) {
            out = out.replace(variant, canonical);
        }
    }
    out
}
