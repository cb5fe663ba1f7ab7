//! # linker-core — Entity Explanation Linking for Dutch Text
//!
//! This crate decides, per named entity in a text, whether an inline
//! encyclopedic explanation is needed, and builds the annotated text. It
//! assumes an upstream linking service (DBpedia Spotlight with the Dutch
//! model) has already recognized and disambiguated the entities; this side
//! only fetches explanations and makes the necessity decision.
//!
//! ## Pipeline
//!
//! Raw text flows through four stages:
//!
//! 1. **Resolution** ([`linker`], [`spotlight`], [`lookup`], [`wikipedia`],
//!    [`cache`]): the linking service returns `{surface form, offset, uri,
//!    confidence}` per entity; uris are mapped to Wikipedia article titles
//!    and a summary is attached, from the write-through cache when
//!    possible.
//! 2. **Context extraction** ([`context`], [`text`]): the first sentence
//!    containing the entity, plus one neighbour on each side.
//! 3. **Scoring** ([`scorer`], [`semantics`], [`lexicon`]): a bounded
//!    "explanation needed" score from the semantic similarity between the
//!    cleaned context and the candidate explanation texts, short-circuited
//!    by a frequency-derived common-knowledge blacklist.
//! 4. **Annotation** ([`linker`]): explanations for "needed" entities are
//!    inserted into the text at their source offsets, and every decision is
//!    recorded in full for later human validation.
//!
//! ## Example
//!
//! ```no_run
//! use linker_core::{EntityLinker, LinkerConfig, LinkStatus};
//! use linker_core::config::{DEFAULT_CONFIDENCE, DEFAULT_THRESHOLD};
//!
//! # fn main() -> Result<(), linker_core::LinkerError> {
//! let config = LinkerConfig::default();
//! let mut linker = EntityLinker::from_config(&config)?;
//!
//! let text = "De Martinitoren staat in Groningen.";
//! let outcome = linker.resolve(text, DEFAULT_CONFIDENCE);
//!
//! if outcome.status == LinkStatus::Ok {
//!     let result = linker.annotate(&outcome, text, DEFAULT_THRESHOLD)?;
//!     println!("{}", result.output_text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design notes
//!
//! - Everything is single-threaded and blocking; a corpus run processes
//!   documents one at a time and every summary fetch blocks the caller.
//! - The explanation cache is persisted after every write so a killed run
//!   never loses previously fetched summaries.
//! - The external seams (linking service, summary service, similarity
//!   model, cache storage) are traits, so the decision logic is testable
//!   without any service or embedding file.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod lexicon;
pub mod linker;
pub mod lookup;
pub mod scorer;
pub mod semantics;
pub mod spotlight;
pub mod text;
pub mod wikipedia;

pub use config::LinkerConfig;
pub use context::ContextWindow;
pub use error::LinkerError;
pub use linker::{
    AnnotatedEntity, AnnotationResult, EntityLinker, LinkStatus, ResolveOutcome, ResolvedEntity,
};
pub use scorer::{Choice, NecessityScorer};
pub use semantics::{SemanticModel, WordVectors};
pub use spotlight::{LinkService, RecognizedEntity, SpotlightClient};
pub use wikipedia::{SummaryProvider, WikiSummary, WikipediaClient};
