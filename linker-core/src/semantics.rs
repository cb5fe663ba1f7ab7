//! # Semantic similarity
//!
//! The necessity score rests on one capability: how close in meaning are
//! two pieces of text? That capability is abstracted behind the
//! [`SemanticModel`] trait so the scorer can be tested with fixed-value
//! fakes, independent of any particular embedding provider.
//!
//! The production implementation, [`WordVectors`], loads pretrained Dutch
//! word embeddings from a word2vec text file and compares texts by the
//! cosine of their averaged token vectors. Crude next to a sentence
//! encoder, but cheap, deterministic and good enough to separate "the
//! context already explains this" from "it does not".

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::LinkerError;

/// An injected similarity capability.
pub trait SemanticModel {
    /// Whether a token has a semantic representation at all. Tokens
    /// without one are stripped from sentences before comparison.
    fn has_vector(&self, token: &str) -> bool;

    /// Similarity between two texts, nominally in `[-1, 1]`. Texts with
    /// no representable tokens compare as `0.0`.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Word embeddings loaded from a word2vec-style text file: an optional
/// `<count> <dims>` header line, then one `<token> <v1> <v2> ...` per line.
/// Tokens are stored lowercased.
#[derive(Debug)]
pub struct WordVectors {
    vectors: HashMap<String, Vec<f32>>,
    dims: usize,
}

impl WordVectors {
    pub fn load(path: &Path) -> Result<Self, LinkerError> {
        let file = File::open(path).map_err(|e| LinkerError::io(path, e))?;
        let reader = BufReader::new(file);

        let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
        let mut dims = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| LinkerError::io(path, e))?;

            // word2vec text files may start with a "<count> <dims>" header
            if i == 0 && is_header(&line) {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else { continue };

            let values: Vec<f32> = parts
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| malformed(path, i + 1))?;

            if values.is_empty() {
                return Err(malformed(path, i + 1));
            }
            if dims == 0 {
                dims = values.len();
            } else if values.len() != dims {
                return Err(malformed(path, i + 1));
            }

            vectors.insert(token.to_lowercase(), values);
        }

        info!(tokens = vectors.len(), dims, "loaded word vectors");
        Ok(Self { vectors, dims })
    }

    /// Builds a model directly from token/vector pairs; mainly for tests.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<f32>)>) -> Self {
        let vectors: HashMap<String, Vec<f32>> = pairs.into_iter().collect();
        let dims = vectors.values().next().map_or(0, Vec::len);
        Self { vectors, dims }
    }

    /// Average vector over the representable tokens of `text`, or `None`
    /// when no token is known.
    fn text_vector(&self, text: &str) -> Option<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dims];
        let mut count = 0usize;

        for word in text.unicode_words() {
            if let Some(v) = self.vectors.get(&word.to_lowercase()) {
                for (s, x) in sum.iter_mut().zip(v) {
                    *s += x;
                }
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }
        for s in &mut sum {
            *s /= count as f32;
        }
        Some(sum)
    }
}

impl SemanticModel for WordVectors {
    fn has_vector(&self, token: &str) -> bool {
        self.vectors.contains_key(&token.to_lowercase())
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        match (self.text_vector(a), self.text_vector(b)) {
            (Some(va), Some(vb)) => cosine(&va, &vb),
            _ => 0.0,
        }
    }
}

fn is_header(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    fields.len() == 2 && fields.iter().all(|f| f.parse::<usize>().is_ok())
}

fn malformed(path: &Path, line: usize) -> LinkerError {
    LinkerError::MalformedVector { path: PathBuf::from(path), line }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
