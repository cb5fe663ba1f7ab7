//! # Necessity scorer
//!
//! The core decision: does this entity need an inline explanation?
//!
//! The score runs from `1.0` (definitely not needed) down to `0.0` and, in
//! rare cases, slightly below zero (definitely needed). It is never
//! clamped. Two short-circuits come first:
//!
//! 1. an invalid context window scores `1.0` with reason [`Choice::Error`];
//! 2. a blacklisted (common knowledge) entity scores `1.0` with reason
//!    [`Choice::CommonKnowledge`], whatever its context says.
//!
//! Otherwise the score is a weighted average of semantic similarities
//! between the cleaned context sentences and two cleaned candidate texts:
//! the short description (the text that would actually be inserted) and
//! the first sentence of the encyclopedia extract. A high similarity means
//! the context already conveys what the explanation would add, so the
//! explanation is redundant.
//!
//! The default weights favour the description (0.7 vs 0.3): it is the text
//! that ends up in the output, and the longer extract is more detailed and
//! thus more prone to noise affecting the similarity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::context::ContextWindow;
use crate::error::LinkerError;
use crate::semantics::SemanticModel;

/// Default weight of the description similarity.
pub const EXPLANATION_WEIGHT: f64 = 0.7;
/// Default weight of the extract similarity.
pub const EXTRACT_WEIGHT: f64 = 0.3;

/// Why a score came out the way it did. Stored with every record so the
/// decision can be audited afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Choice {
    /// The score was derived from contextual similarity.
    Context,
    /// The entity is on the common-knowledge blacklist.
    CommonKnowledge,
    /// The entity could not be located in any sentence.
    Error,
}

/// Computes the "explanation needed" score for one entity.
pub struct NecessityScorer {
    stop_words: HashSet<String>,
    blacklist: HashSet<String>,
    model: Box<dyn SemanticModel>,
    explanation_weight: f64,
    extract_weight: f64,
}

impl NecessityScorer {
    pub fn new(
        stop_words: HashSet<String>,
        blacklist: HashSet<String>,
        model: Box<dyn SemanticModel>,
    ) -> Self {
        Self {
            stop_words,
            blacklist,
            model,
            explanation_weight: EXPLANATION_WEIGHT,
            extract_weight: EXTRACT_WEIGHT,
        }
    }

    /// Overrides the similarity weights.
    pub fn with_weights(mut self, explanation_weight: f64, extract_weight: f64) -> Self {
        self.explanation_weight = explanation_weight;
        self.extract_weight = extract_weight;
        self
    }

    /// Scores one entity given its context window, the first sentence of
    /// the encyclopedia extract and the short description.
    ///
    /// Returns the score plus the reason it was given. The only error case
    /// is the (empirically unobserved) situation where not a single
    /// context sentence survives as input for the average; that is an
    /// invariant violation and fails loudly rather than dividing by zero.
    pub fn score(
        &self,
        entity: &str,
        window: &ContextWindow,
        extract: &str,
        explanation: &str,
    ) -> Result<(f64, Choice), LinkerError> {
        if !window.is_valid() {
            return Ok((1.0, Choice::Error));
        }

        if self.blacklist.contains(&entity.to_lowercase()) {
            return Ok((1.0, Choice::CommonKnowledge));
        }

        // One cleaned entry per non-empty context part. A part may clean
        // down to the empty string but still counts towards the average,
        // matching the reference behaviour.
        let clean_sentences: Vec<String> = [&window.left, &window.sentence, &window.right]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(|part| self.clean(part, entity))
            .collect();

        if clean_sentences.is_empty() {
            return Err(LinkerError::EmptyCleanContext(entity.to_string()));
        }

        let clean_extract = self.clean(extract, entity);
        let clean_explanation = self.clean(explanation, entity);

        let explanation_sum: f64 = if clean_explanation.is_empty() {
            0.0
        } else {
            clean_sentences.iter().map(|s| self.model.similarity(s, &clean_explanation)).sum()
        };

        let extract_sum: f64 = if clean_extract.is_empty() {
            0.0
        } else {
            clean_sentences.iter().map(|s| self.model.similarity(s, &clean_extract)).sum()
        };

        let count = clean_sentences.len() as f64;
        let avg_explanation_sim = explanation_sum / count;
        let avg_extract_sim = extract_sum / count;

        let score = avg_explanation_sim * self.explanation_weight
            + avg_extract_sim * self.extract_weight;

        Ok((score, Choice::Context))
    }

    /// Removes stop words, the entity's own token and tokens without a
    /// semantic representation, leaving only the words that can carry the
    /// comparison.
    fn clean(&self, text: &str, entity: &str) -> String {
        text.unicode_words()
            .filter(|word| {
                !self.stop_words.contains(&word.to_lowercase())
                    && *word != entity
                    && self.model.has_vector(word)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
