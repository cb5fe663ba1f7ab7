//! # Entity-linking service client
//!
//! Client for a DBpedia Spotlight style annotate endpoint. Spotlight does
//! the heavy lifting (recognition and disambiguation); this side only
//! sends the text with a confidence filter and a type allowlist, and maps
//! the response into [`RecognizedEntity`] values.
//!
//! Two service quirks are handled here:
//!
//! - numeric fields (`@offset`, `@similarityScore`) arrive as JSON strings;
//! - a text without matches comes back without a `Resources` key, which is
//!   reported as [`LinkerError::NoEntities`] so the resolver can degrade
//!   to an empty result instead of treating it as a fault.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LinkerError;

/// Entity types requested from the service; the best set for named
/// entities in running text.
pub const ENTITY_TYPES: &[&str] =
    &["DBpedia:Name", "DBpedia:Organisation", "DBpedia:Person", "DBpedia:Place"];

/// One entity as recognized and disambiguated by the linking service.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// The literal text span that was recognized.
    pub surface_form: String,
    /// Canonical DBpedia resource uri, the stable identity of the entity.
    pub uri: String,
    /// Byte offset of the surface form in the source text.
    pub offset: usize,
    /// Disambiguation confidence reported by the service.
    pub confidence: f64,
}

/// The linking service seen from the pipeline: a startup probe and the
/// annotate call. Production is [`SpotlightClient`]; tests use fakes.
pub trait LinkService {
    /// Connectivity probe, run once at startup. Failure here means the
    /// system is misconfigured and should not start.
    fn check(&self) -> Result<(), LinkerError>;

    /// Recognizes entities in `text` above the confidence threshold, in
    /// document order.
    fn annotate(&self, text: &str, confidence: f64) -> Result<Vec<RecognizedEntity>, LinkerError>;
}

/// Blocking HTTP client for the annotate endpoint.
pub struct SpotlightClient {
    url: String,
    types: String,
    http: reqwest::blocking::Client,
}

impl SpotlightClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            types: ENTITY_TYPES.join(","),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl LinkService for SpotlightClient {
    fn check(&self) -> Result<(), LinkerError> {
        let unreachable = |reason: String| LinkerError::ServiceUnreachable {
            url: self.url.clone(),
            reason,
        };

        let response = self
            .http
            .get(&self.url)
            .query(&[("text", "test")])
            .send()
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("status {}", response.status())));
        }
        Ok(())
    }

    fn annotate(&self, text: &str, confidence: f64) -> Result<Vec<RecognizedEntity>, LinkerError> {
        let confidence = confidence.to_string();
        let body = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("text", text),
                ("confidence", confidence.as_str()),
                ("types", self.types.as_str()),
            ])
            .send()?
            .error_for_status()?
            .text()?;

        parse_annotate_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(rename = "Resources")]
    resources: Option<Vec<Resource>>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    #[serde(rename = "@URI")]
    uri: String,
    #[serde(rename = "@surfaceForm")]
    surface_form: String,
    #[serde(rename = "@offset", deserialize_with = "number_from_string")]
    offset: usize,
    #[serde(rename = "@similarityScore", deserialize_with = "float_from_string")]
    similarity_score: f64,
}

fn number_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(D::Error::custom)
}

fn float_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(D::Error::custom)
}

fn parse_annotate_response(body: &str) -> Result<Vec<RecognizedEntity>, LinkerError> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|_| LinkerError::NoEntities)?;

    let resources = response.resources.ok_or(LinkerError::NoEntities)?;
    if resources.is_empty() {
        return Err(LinkerError::NoEntities);
    }

    Ok(resources
        .into_iter()
        .map(|r| RecognizedEntity {
            surface_form: r.surface_form,
            uri: r.uri,
            offset: r.offset,
            confidence: r.similarity_score,
        })
        .collect())
}
