//! # Text helpers
//!
//! Sentence segmentation and offset-based insertion. Segmentation follows
//! the UAX #29 sentence boundary rules via `unicode-segmentation`, which
//! handles the common Dutch cases (abbreviations with trailing dots are the
//! known weak spot, same as any rule-based segmenter).
//!
//! All offsets in this crate are **byte** offsets into the original text.
//! Insertion clamps to the nearest char boundary so a bad offset from the
//! linking service can never panic a batch run.

use unicode_segmentation::UnicodeSegmentation;

/// Splits a text into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First sentence of a text, or the empty string when there is none.
///
/// The first sentence of an encyclopedia extract is the most direct
/// explanation of an entity, so that one is used as the similarity signal.
pub fn first_sentence(text: &str) -> String {
    text.split_sentence_bounds()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Inserts `insertion` into `text` at byte position `at`.
///
/// Positions past the end are clamped to the end; positions inside a
/// multi-byte char are moved back to the previous boundary.
pub fn insert(text: &str, insertion: &str, at: usize) -> String {
    let mut at = at.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }

    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..at]);
    out.push_str(insertion);
    out.push_str(&text[at..]);
    out
}
