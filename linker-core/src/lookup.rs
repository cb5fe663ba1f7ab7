//! # DBpedia → Wikipedia lookup table
//!
//! The linking service identifies entities by DBpedia resource uri, but the
//! summary api is keyed by Wikipedia article title. This table bridges the
//! two. It is built offline from the "Links to Wikipedia Article" dataset
//! published by DBpedia and stored as a binary map.
//!
//! Keys keep the angle-bracketed N-Triples form of the dataset
//! (`<http://nl.dbpedia.org/resource/...>`), values are the bracketed
//! Wikipedia links. Uris without an entry are expected (not every resource
//! has a Dutch article) and simply drop the entity from resolution.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LinkerError;

const WIKI_LINK_PREFIX: &str = "<http://nl.wikipedia.org/wiki/";

/// In-memory uri → Wikipedia-link table.
#[derive(Debug, Clone, Default)]
pub struct WikiLookup {
    entries: HashMap<String, String>,
}

impl WikiLookup {
    /// Loads the bincode-encoded table produced by the offline build step.
    pub fn load(path: &Path) -> Result<Self, LinkerError> {
        let file = File::open(path).map_err(|e| LinkerError::io(path, e))?;
        let entries = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| LinkerError::codec(path, e))?;
        Ok(Self { entries })
    }

    /// Builds a table directly from entries; mainly useful in tests.
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// The Wikipedia link for a bare resource uri, looked up under its
    /// angle-bracketed key form. `None` means there is no Dutch article
    /// and the entity should be skipped.
    pub fn link_for_uri(&self, uri: &str) -> Option<&str> {
        self.entries.get(&format!("<{uri}>")).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips the link decoration down to the article title fragment used by
/// the summary api, e.g. `<http://nl.wikipedia.org/wiki/Groningen_(stad)>`
/// becomes `Groningen_(stad)`.
pub fn wiki_title(link: &str) -> String {
    link.trim_start_matches(WIKI_LINK_PREFIX).trim_end_matches('>').to_string()
}
