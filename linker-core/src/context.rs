//! # Context extraction
//!
//! The decision whether an explanation is needed looks at the *local*
//! context of an entity: the first sentence it occurs in plus one
//! neighbouring sentence on each side, when those exist.
//!
//! Matching is plain substring search, not token-boundary search. An
//! entity like "Ede" can therefore match inside "beschadigd werd" and pick
//! the wrong sentence. That is a known limitation of the original system
//! and is deliberately kept, not silently fixed.

use serde::{Deserialize, Serialize};

/// The sentences surrounding the first occurrence of an entity.
///
/// `raw` is the space-joined, trimmed concatenation of the three parts
/// and is what the rendered context variants are built from. An invalid
/// window (no sentence contained the entity) has all parts empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub left: String,
    pub sentence: String,
    pub right: String,
    pub raw: String,
}

impl ContextWindow {
    /// A window is valid when a center sentence was found. Segmentation
    /// mismatches between this crate and the linking service make the
    /// invalid case rare but real (roughly once every few thousand
    /// documents), and it is signalled downstream with a sentinel score
    /// instead of an error.
    pub fn is_valid(&self) -> bool {
        !self.sentence.is_empty()
    }
}

/// Finds the context window for an entity in the segmented document.
///
/// Scans in order and takes the **first** sentence containing the surface
/// form, so a repeated entity is always judged at its first mention.
pub fn context_for(entity: &str, sentences: &[String]) -> ContextWindow {
    for (i, sentence) in sentences.iter().enumerate() {
        if !sentence.contains(entity) {
            continue;
        }

        let left = if i == 0 { String::new() } else { sentences[i - 1].clone() };
        let right =
            if i + 1 == sentences.len() { String::new() } else { sentences[i + 1].clone() };
        let raw = format!("{left} {sentence} {right}").trim().to_string();

        return ContextWindow { left, sentence: sentence.clone(), right, raw };
    }

    ContextWindow::default()
}
