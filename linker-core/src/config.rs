//! Central configuration: service urls, data file locations and the
//! default decision parameters.
//!
//! All data files live together in one directory (`data/` by default) so a
//! corpus run can be resumed or repeated by pointing at the same directory.

use std::path::{Path, PathBuf};

/// Default confidence passed to the linking service. It might seem low,
/// but the service is pretty strict with high confidences and there were
/// not that many errors at this level.
pub const DEFAULT_CONFIDENCE: f64 = 0.4;

/// Default decision threshold: entities scoring strictly above it are
/// considered common enough to leave unexplained.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Locations of the external services and the data directory.
#[derive(Debug, Clone)]
pub struct LinkerConfig {
    /// Annotate endpoint of the entity-linking service (a locally running
    /// DBpedia Spotlight with the Dutch model).
    pub spotlight_url: String,
    /// Base url of the encyclopedia summary api; the article title is
    /// appended directly to this.
    pub wiki_api_url: String,
    /// Directory holding the stop words, blacklist, lookup table, word
    /// vectors, explanation cache and batch output.
    pub data_dir: PathBuf,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            spotlight_url: "http://0.0.0.0:2232/rest/annotate".to_string(),
            wiki_api_url: "https://nl.wikipedia.org/api/rest_v1/page/summary/".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl LinkerConfig {
    /// Config with everything at its default location except the data
    /// directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Self::default() }
    }

    /// Plain text file with one stop word per line.
    /// Credits: https://eikhart.com/nl/blog/moderne-stopwoorden-lijst
    pub fn stop_words_path(&self) -> PathBuf {
        self.data_dir.join("stopwoorden.txt")
    }

    /// Binary set of lowercase entities considered common knowledge,
    /// built offline from corpus frequency counts.
    pub fn blacklist_path(&self) -> PathBuf {
        self.data_dir.join("entity_blacklist.bin")
    }

    /// Binary map from DBpedia resource uri to Wikipedia link.
    pub fn lookup_path(&self) -> PathBuf {
        self.data_dir.join("wiki_lookup_table.bin")
    }

    /// Binary map from article title to cached summary response.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("explanation_cache.bin")
    }

    /// Word2vec text file with the Dutch word vectors used for the
    /// similarity computation.
    pub fn word_vectors_path(&self) -> PathBuf {
        self.data_dir.join("word_vectors.txt")
    }

    /// Batch output: one JSON record per line, appended across runs.
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join("out.jsonl")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
