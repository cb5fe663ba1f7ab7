//! # Encyclopedia summary client
//!
//! Thin client for the Wikipedia REST `page/summary` endpoint. Out of the
//! full response only three fields matter here: the title, the short
//! `description` (what gets inserted into the text) and the longer
//! `extract` (whose first sentence is a secondary similarity signal).
//!
//! The api sometimes returns other shapes than documented, or present but
//! empty fields; both are modelled as empty strings and treated as an
//! "insufficient data" outcome rather than an error, so the caller can
//! skip the entity and move on.

use serde::{Deserialize, Serialize};

use crate::error::LinkerError;

/// The parts of a summary response this system uses. Missing fields
/// deserialize to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extract: String,
}

impl WikiSummary {
    /// A summary is only usable when both the description and the extract
    /// carry text; anything less and the entity is excluded from the
    /// decision entirely.
    pub fn usable(&self) -> bool {
        !self.description.is_empty() && !self.extract.is_empty()
    }
}

/// Anything that can produce a summary for an article title. The
/// production implementation talks to the Wikipedia api; tests inject
/// in-memory fakes with call counting.
pub trait SummaryProvider {
    fn fetch(&self, title: &str) -> Result<WikiSummary, LinkerError>;
}

/// Blocking HTTP client for the summary endpoint.
pub struct WikipediaClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl WikipediaClient {
    /// `base_url` should end in a slash; the article title is appended
    /// directly to it.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl SummaryProvider for WikipediaClient {
    fn fetch(&self, title: &str) -> Result<WikiSummary, LinkerError> {
        // A 404 body also parses into a (useless) summary; usability is
        // checked downstream, not here.
        let summary = self
            .http
            .get(format!("{}{}", self.base_url, title))
            .send()?
            .json()?;
        Ok(summary)
    }
}
