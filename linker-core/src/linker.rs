//! # Entity linker — orchestrator
//!
//! Connects the stages into the full pipeline:
//!
//! 1. **Resolve** ([`EntityLinker::resolve`]): send the text to the
//!    linking service, map each recognized entity to its Wikipedia
//!    article, and attach a summary (cached or freshly fetched).
//! 2. **Annotate** ([`EntityLinker::annotate`]): per resolved entity,
//!    extract the context window, compute the necessity score, build the
//!    audit record, and insert the explanation into the output text when
//!    the score says it is needed.
//!
//! The output record shape is the exact input contract of the downstream
//! validation store, so field names are part of the wire format and must
//! not change.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{ExplanationCache, FileStore};
use crate::config::LinkerConfig;
use crate::context::context_for;
use crate::error::LinkerError;
use crate::lexicon::{load_blacklist, load_stop_words};
use crate::lookup::{wiki_title, WikiLookup};
use crate::scorer::{Choice, NecessityScorer};
use crate::semantics::WordVectors;
use crate::spotlight::{LinkService, RecognizedEntity, SpotlightClient};
use crate::text::{first_sentence, insert, split_sentences};
use crate::wikipedia::{SummaryProvider, WikiSummary, WikipediaClient};

/// Markup wrapped around an inserted explanation in the highlighted
/// context variant. Done here rather than in a front end because nested
/// brackets in a sentence make it fragile to do later.
pub const HIGHLIGHT_START: &str = "<span class=\"annotation\">";
pub const HIGHLIGHT_END: &str = "</span>";

/// Outcome status of a resolve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    /// Resolution was attempted, even if every entity was filtered out.
    Ok,
    /// The linking service failed or found nothing; the entity list is
    /// empty and the document should be skipped.
    NoEntities,
}

/// A recognized entity together with its encyclopedic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// The surface form the entity was first seen under.
    pub surface_form: String,
    /// The raw service annotation (uri, offset, confidence).
    pub dbpedia: RecognizedEntity,
    /// The summary, possibly unusable (checked during annotation).
    pub wikipedia: WikiSummary,
}

/// Entities with summaries, in encounter order, plus the status.
///
/// Encounter order is load-bearing: [`EntityLinker::annotate`] replays
/// this order when accumulating insertion offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub entities: Vec<ResolvedEntity>,
    pub status: LinkStatus,
}

impl ResolveOutcome {
    fn no_entities() -> Self {
        Self { entities: Vec::new(), status: LinkStatus::NoEntities }
    }
}

/// Everything recorded about one scored entity. This is both the audit
/// trail and the row shape of the external validation store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedEntity {
    pub entity: String,
    /// The short description, as inserted (without the brackets).
    pub explanation: String,
    /// First sentence of the encyclopedia extract.
    pub extract: String,
    pub score: f64,
    pub choice: Choice,
    pub context_with_explanation: String,
    pub context_without_explanation: String,
    pub context_highlighted: String,
}

/// Result of annotating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub input_text: String,
    /// The input with explanations inserted for every "needed" entity.
    pub output_text: String,
    /// Entities whose explanation was inserted (score <= threshold).
    pub annotated_entities: Vec<AnnotatedEntity>,
    /// Entities judged not to need one; kept in full for validation.
    pub ignored_entities: Vec<AnnotatedEntity>,
}

/// The pipeline facade. Owns the service clients, the lookup table, the
/// explanation cache and the scorer.
pub struct EntityLinker {
    link_service: Box<dyn LinkService>,
    summaries: Box<dyn SummaryProvider>,
    lookup: WikiLookup,
    cache: ExplanationCache,
    scorer: NecessityScorer,
}

impl EntityLinker {
    /// Assembles a linker from explicit components and probes the linking
    /// service once. An unreachable service is a misconfiguration, not a
    /// transient fault, so it fails construction.
    pub fn new(
        link_service: Box<dyn LinkService>,
        summaries: Box<dyn SummaryProvider>,
        lookup: WikiLookup,
        cache: ExplanationCache,
        scorer: NecessityScorer,
    ) -> Result<Self, LinkerError> {
        link_service.check()?;
        Ok(Self { link_service, summaries, lookup, cache, scorer })
    }

    /// Assembles the production pipeline: HTTP clients from the config
    /// urls, file-backed cache, and all data files loaded from the
    /// configured data directory.
    pub fn from_config(config: &LinkerConfig) -> Result<Self, LinkerError> {
        let stop_words = load_stop_words(&config.stop_words_path())?;
        let blacklist = load_blacklist(&config.blacklist_path())?;
        let lookup = WikiLookup::load(&config.lookup_path())?;
        let cache = ExplanationCache::open(Box::new(FileStore::new(config.cache_path())))?;
        let model = WordVectors::load(&config.word_vectors_path())?;

        Self::new(
            Box::new(SpotlightClient::new(config.spotlight_url.clone())),
            Box::new(WikipediaClient::new(config.wiki_api_url.clone())),
            lookup,
            cache,
            NecessityScorer::new(stop_words, blacklist, Box::new(model)),
        )
    }

    /// Finds entities in `text` and attaches encyclopedic summaries.
    ///
    /// Never fails: a service error degrades to
    /// [`LinkStatus::NoEntities`], and entities without a lookup entry or
    /// without a fetchable summary are dropped silently. Entities are
    /// deduplicated by canonical link, so a repeat of the same article
    /// under a different surface form is resolved only once; a repeated
    /// surface form replaces the data of its earlier entry in place.
    pub fn resolve(&mut self, text: &str, confidence: f64) -> ResolveOutcome {
        let recognized = match self.link_service.annotate(text, confidence) {
            Ok(recognized) => recognized,
            Err(err) => {
                debug!(error = %err, "linking service returned nothing");
                return ResolveOutcome::no_entities();
            }
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut entities: Vec<ResolvedEntity> = Vec::new();

        for entity in recognized {
            // Only resolve each article once per document
            let Some(link) = self.lookup.link_for_uri(&entity.uri) else { continue };
            let link = link.to_string();
            if !seen.insert(link.clone()) {
                continue;
            }

            let title = wiki_title(&link);

            let summary = match self.cache.get(&title) {
                Some(cached) => {
                    debug!(%title, "summary from cache");
                    cached.clone()
                }
                None => {
                    let fetched = match self.summaries.fetch(&title) {
                        Ok(fetched) => fetched,
                        Err(err) => {
                            warn!(%title, error = %err, "summary fetch failed, skipping entity");
                            continue;
                        }
                    };
                    debug!(%title, "summary from wiki");

                    // Write-through: losing a fetched summary to a crash
                    // costs an api call on the next run, losing the whole
                    // batch costs hours.
                    if let Err(err) = self.cache.insert(title.clone(), fetched.clone()) {
                        warn!(%title, error = %err, "could not persist explanation cache");
                    }
                    fetched
                }
            };

            // Insertion-ordered map semantics: a repeated surface form
            // replaces the data of its earlier entry but keeps its slot
            match entities.iter().position(|e| e.surface_form == entity.surface_form) {
                Some(pos) => {
                    entities[pos].dbpedia = entity;
                    entities[pos].wikipedia = summary;
                }
                None => entities.push(ResolvedEntity {
                    surface_form: entity.surface_form.clone(),
                    dbpedia: entity,
                    wikipedia: summary,
                }),
            }
        }

        ResolveOutcome { entities, status: LinkStatus::Ok }
    }

    /// Scores every resolved entity and builds the annotated document.
    ///
    /// Entities scoring strictly above `threshold` keep their record but
    /// have the explanation withheld from the output text.
    ///
    /// Insertion offsets are accumulated in **encounter order** (the order
    /// summaries were resolved), not in text order. Every inserted
    /// explanation shifts all later offsets by its own length, so
    /// reordering this loop would corrupt the output.
    pub fn annotate(
        &self,
        outcome: &ResolveOutcome,
        raw_text: &str,
        threshold: f64,
    ) -> Result<AnnotationResult, LinkerError> {
        let doc_sents = split_sentences(raw_text);

        let mut needed = Vec::new();
        let mut not_needed = Vec::new();

        let mut output_text = raw_text.to_string();
        let mut shift = 0usize;

        for resolved in &outcome.entities {
            if !resolved.wikipedia.usable() {
                continue;
            }

            let extract = first_sentence(&resolved.wikipedia.extract);
            let explanation = resolved.wikipedia.description.clone();
            let explanation_formatted = format!(" ({explanation})");

            let window = context_for(&resolved.surface_form, &doc_sents);

            // Insert just after the entity's first occurrence in the raw
            // context; for an invalid (empty) window this degrades to
            // position 0.
            let insert_at = window
                .raw
                .find(&resolved.surface_form)
                .map(|pos| pos + resolved.surface_form.len())
                .unwrap_or(0);

            let context_with_explanation = insert(&window.raw, &explanation_formatted, insert_at);
            let context_highlighted = insert(
                &window.raw,
                &format!(" {HIGHLIGHT_START}{}{HIGHLIGHT_END}", explanation_formatted.trim()),
                insert_at,
            );

            let (score, choice) =
                self.scorer.score(&resolved.surface_form, &window, &extract, &explanation)?;

            let record = AnnotatedEntity {
                entity: resolved.surface_form.clone(),
                explanation,
                extract,
                score,
                choice,
                context_with_explanation,
                context_without_explanation: window.raw.clone(),
                context_highlighted,
            };

            if score > threshold {
                not_needed.push(record);
                continue;
            }

            needed.push(record);

            let position = resolved.dbpedia.offset + shift + resolved.surface_form.len();
            output_text = insert(&output_text, &explanation_formatted, position);
            shift += explanation_formatted.len();
        }

        debug!(needed = needed.len(), not_needed = not_needed.len(), "document annotated");

        Ok(AnnotationResult {
            input_text: raw_text.to_string(),
            output_text,
            annotated_entities: needed,
            ignored_entities: not_needed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::semantics::SemanticModel;

    struct FakeLinkService {
        entities: Vec<RecognizedEntity>,
        fail: bool,
    }

    impl LinkService for FakeLinkService {
        fn check(&self) -> Result<(), LinkerError> {
            Ok(())
        }

        fn annotate(&self, _text: &str, _confidence: f64) -> Result<Vec<RecognizedEntity>, LinkerError> {
            if self.fail {
                return Err(LinkerError::NoEntities);
            }
            Ok(self.entities.clone())
        }
    }

    struct CountingSummaries {
        summaries: HashMap<String, WikiSummary>,
        calls: Rc<Cell<usize>>,
    }

    impl SummaryProvider for CountingSummaries {
        fn fetch(&self, title: &str) -> Result<WikiSummary, LinkerError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.summaries.get(title).cloned().unwrap_or_default())
        }
    }

    struct FixedModel(f64);

    impl SemanticModel for FixedModel {
        fn has_vector(&self, _token: &str) -> bool {
            true
        }

        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            self.0
        }
    }

    fn recognized(surface: &str, uri: &str, offset: usize) -> RecognizedEntity {
        RecognizedEntity {
            surface_form: surface.to_string(),
            uri: uri.to_string(),
            offset,
            confidence: 0.9,
        }
    }

    fn summary(description: &str, extract: &str) -> WikiSummary {
        WikiSummary {
            title: String::new(),
            description: description.to_string(),
            extract: extract.to_string(),
        }
    }

    fn lookup(pairs: &[(&str, &str)]) -> WikiLookup {
        WikiLookup::from_entries(
            pairs
                .iter()
                .map(|(uri, title)| {
                    (format!("<{uri}>"), format!("<http://nl.wikipedia.org/wiki/{title}>"))
                })
                .collect(),
        )
    }

    struct Setup {
        linker: EntityLinker,
        fetch_calls: Rc<Cell<usize>>,
    }

    fn setup(
        entities: Vec<RecognizedEntity>,
        fail: bool,
        lookup: WikiLookup,
        summaries: HashMap<String, WikiSummary>,
        similarity: f64,
    ) -> Setup {
        let fetch_calls = Rc::new(Cell::new(0));
        let linker = EntityLinker::new(
            Box::new(FakeLinkService { entities, fail }),
            Box::new(CountingSummaries { summaries, calls: Rc::clone(&fetch_calls) }),
            lookup,
            ExplanationCache::in_memory(),
            NecessityScorer::new(
                std::collections::HashSet::new(),
                std::collections::HashSet::new(),
                Box::new(FixedModel(similarity)),
            ),
        )
        .unwrap();

        Setup { linker, fetch_calls }
    }

    #[test]
    fn test_service_failure_degrades_to_no_entities() {
        let mut s = setup(vec![], true, lookup(&[]), HashMap::new(), 0.0);
        let outcome = s.linker.resolve("wat tekst", 0.4);
        assert_eq!(outcome.status, LinkStatus::NoEntities);
        assert!(outcome.entities.is_empty());
    }

    #[test]
    fn test_missing_lookup_entry_drops_entity() {
        let mut s = setup(
            vec![recognized("Grunn", "http://nl.dbpedia.org/resource/Grunn", 0)],
            false,
            lookup(&[]),
            HashMap::new(),
            0.0,
        );
        let outcome = s.linker.resolve("Grunn is mooi.", 0.4);
        assert_eq!(outcome.status, LinkStatus::Ok);
        assert!(outcome.entities.is_empty());
        assert_eq!(s.fetch_calls.get(), 0);
    }

    #[test]
    fn test_dedup_by_canonical_link() {
        // two surface forms, one article: only the first is kept and only
        // one summary fetch happens
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0), recognized("Grunn", uri, 30)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("stad", "Groningen is een stad."))]),
            0.0,
        );

        let outcome = s.linker.resolve("Groningen is mooi. Iedereen zegt Grunn.", 0.4);
        assert_eq!(outcome.entities.len(), 1);
        assert_eq!(outcome.entities[0].surface_form, "Groningen");
        assert_eq!(s.fetch_calls.get(), 1);
    }

    #[test]
    fn test_cache_makes_repeat_resolves_idempotent() {
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("stad", "Groningen is een stad."))]),
            0.0,
        );

        let first = s.linker.resolve("Groningen is mooi.", 0.4);
        let second = s.linker.resolve("Groningen is mooi.", 0.4);

        assert_eq!(s.fetch_calls.get(), 1);
        assert_eq!(first.entities[0].wikipedia, second.entities[0].wikipedia);
    }

    #[test]
    fn test_offset_shift_accumulates_in_encounter_order() {
        let text = "A B C";
        let uri_a = "http://nl.dbpedia.org/resource/A";
        let uri_c = "http://nl.dbpedia.org/resource/C";

        let mut s = setup(
            vec![recognized("A", uri_a, 0), recognized("C", uri_c, 4)],
            false,
            lookup(&[(uri_a, "A"), (uri_c, "C")]),
            HashMap::from([
                ("A".to_string(), summary("xxxxx", "A is iets.")),
                ("C".to_string(), summary("yyy", "C is iets.")),
            ]),
            0.0, // similarity 0 → every entity is "needed"
        );

        let outcome = s.linker.resolve(text, 0.4);
        let result = s.linker.annotate(&outcome, text, 0.5).unwrap();

        // " (xxxxx)" is 8 bytes, so C's insertion point moves from 5 to 13
        assert_eq!(result.output_text, "A (xxxxx) B C (yyy)");
        assert_eq!(result.annotated_entities.len(), 2);
        assert!(result.ignored_entities.is_empty());
    }

    #[test]
    fn test_threshold_boundary_withholds() {
        // weights (1.0, 0.0) and a fixed similarity make the score land
        // exactly on the threshold; withholding uses strictly-greater, so
        // an exact hit still gets its explanation
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let fetch_calls = Rc::new(Cell::new(0));
        let mut linker = EntityLinker::new(
            Box::new(FakeLinkService {
                entities: vec![recognized("Groningen", uri, 0)],
                fail: false,
            }),
            Box::new(CountingSummaries {
                summaries: HashMap::from([(
                    "Groningen".to_string(),
                    summary("stad", "Groningen is een stad."),
                )]),
                calls: fetch_calls,
            }),
            lookup(&[(uri, "Groningen")]),
            ExplanationCache::in_memory(),
            NecessityScorer::new(
                std::collections::HashSet::new(),
                std::collections::HashSet::new(),
                Box::new(FixedModel(0.5)),
            )
            .with_weights(1.0, 0.0),
        )
        .unwrap();

        let text = "Groningen is mooi.";
        let outcome = linker.resolve(text, 0.4);
        let result = linker.annotate(&outcome, text, 0.5).unwrap();

        // score is exactly 0.5: not strictly greater, so still inserted
        assert_eq!(result.annotated_entities.len(), 1);
        assert!(result.ignored_entities.is_empty());

        // a hair above the score and the entity flips to "not needed"
        let result = linker.annotate(&outcome, text, 0.499).unwrap();
        assert!(result.annotated_entities.is_empty());
        assert_eq!(result.ignored_entities.len(), 1);
        assert_eq!(result.output_text, text);
    }

    #[test]
    fn test_unusable_summary_is_excluded_everywhere() {
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("", "Groningen is een stad."))]),
            0.0,
        );

        let text = "Groningen is mooi.";
        let outcome = s.linker.resolve(text, 0.4);
        let result = s.linker.annotate(&outcome, text, 0.5).unwrap();

        assert!(result.annotated_entities.is_empty());
        assert!(result.ignored_entities.is_empty());
        assert_eq!(result.output_text, text);
    }

    #[test]
    fn test_extraction_failure_lands_in_ignored_with_error() {
        // the entity never occurs literally in the text, so context
        // extraction fails and the sentinel (1.0, ERROR) applies
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("stad", "Groningen is een stad."))]),
            0.0,
        );

        let text = "Hier staat iets heel anders.";
        let outcome = s.linker.resolve(text, 0.4);
        let result = s.linker.annotate(&outcome, text, 0.5).unwrap();

        assert!(result.annotated_entities.is_empty());
        assert_eq!(result.ignored_entities.len(), 1);
        assert_eq!(result.ignored_entities[0].score, 1.0);
        assert_eq!(result.ignored_entities[0].choice, Choice::Error);
        assert_eq!(result.output_text, text);
    }

    #[test]
    fn test_context_variants() {
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("stad", "Groningen is een stad."))]),
            0.0,
        );

        let text = "Groningen is mooi.";
        let outcome = s.linker.resolve(text, 0.4);
        let result = s.linker.annotate(&outcome, text, 0.5).unwrap();

        let record = &result.annotated_entities[0];
        assert_eq!(record.context_without_explanation, "Groningen is mooi.");
        assert_eq!(record.context_with_explanation, "Groningen (stad) is mooi.");
        assert_eq!(
            record.context_highlighted,
            format!("Groningen {HIGHLIGHT_START}(stad){HIGHLIGHT_END} is mooi.")
        );
    }

    #[test]
    fn test_record_wire_format() {
        let uri = "http://nl.dbpedia.org/resource/Groningen";
        let mut s = setup(
            vec![recognized("Groningen", uri, 0)],
            false,
            lookup(&[(uri, "Groningen")]),
            HashMap::from([("Groningen".to_string(), summary("stad", "Groningen is een stad."))]),
            0.0,
        );

        let text = "Groningen is mooi.";
        let outcome = s.linker.resolve(text, 0.4);
        let result = s.linker.annotate(&outcome, text, 0.5).unwrap();

        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();
        assert!(json.get("input_text").is_some());
        assert!(json.get("output_text").is_some());
        assert!(json["annotated_entities"][0].get("context_highlighted").is_some());
        assert_eq!(json["annotated_entities"][0]["choice"], "CONTEXT");
    }
}
