//! Lowercase tokenisation and the prefix-based fuzzy word match used
//! throughout the tool matcher and argument extractor.

pub(crate) const STRIP_CHARS: &[char] =
    &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}'];

/// Lowercases `s`, splits on whitespace, strips the punctuation in
/// `STRIP_CHARS` from each token's ends, and discards anything shorter than
/// two characters.
pub fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .map(|w| w.trim_matches(STRIP_CHARS).to_string())
        .filter(|w| w.len() >= 2)
        .collect()
}

/// Two words are "similar" if they're equal, or both at least three
/// characters long and the shorter is a prefix of the longer. Intentionally
/// crude — good enough for the small, English-only vocabularies a tool
/// catalog has, not a general stemmer.
pub fn similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    longer.starts_with(shorter)
}
