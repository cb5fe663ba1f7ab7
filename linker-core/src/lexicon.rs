//! # Stop words and the common-knowledge blacklist
//!
//! Two static word sets loaded once per process:
//!
//! - **Stop words**: function words removed from sentences before the
//!   similarity computation, so only content words contribute.
//! - **Blacklist**: the top 1% most frequent recognized entities in the
//!   corpus, lowercased. Frequency is used as a proxy for common
//!   knowledge: an entity mentioned that often ("amsterdam",
//!   "nederland") needs no explanation, whatever its context says.
//!
//! Both are sets because membership is the only question we ever ask.
//! The blacklist is produced offline by a frequency-count script and
//! stored in binary form.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LinkerError;

/// Loads the stop word list: a plain text file, one word per line.
pub fn load_stop_words(path: &Path) -> Result<HashSet<String>, LinkerError> {
    let file = File::open(path).map_err(|e| LinkerError::io(path, e))?;

    let mut words = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| LinkerError::io(path, e))?;
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_string());
        }
    }

    Ok(words)
}

/// Loads the entity blacklist: a bincode-encoded set of lowercase
/// entity strings.
pub fn load_blacklist(path: &Path) -> Result<HashSet<String>, LinkerError> {
    let file = File::open(path).map_err(|e| LinkerError::io(path, e))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| LinkerError::codec(path, e))
}
