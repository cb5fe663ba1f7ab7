//! Batch runner: feeds a corpus file through the entity linker and appends
//! one self-contained JSON record per annotated document to the output
//! file, until enough "needed" and "not needed" examples are collected.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use linker_core::config::{DEFAULT_CONFIDENCE, DEFAULT_THRESHOLD};
use linker_core::{EntityLinker, LinkStatus, LinkerConfig};
use tracing::{info, warn};

/// Annotates named entities in a Dutch corpus with explanations where
/// needed.
#[derive(Debug, Parser)]
#[command(name = "linker", version)]
struct Args {
    /// Path to a corpus file: documents separated by blank lines
    path: PathBuf,

    /// How many interesting documents to collect per outcome. The run
    /// stops once this many documents with and this many without inserted
    /// explanations have been written.
    #[arg(short, long, default_value_t = 500)]
    target: usize,

    /// Directory holding the data files (stop words, blacklist, lookup
    /// table, word vectors, explanation cache)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Annotate url of the entity-linking service
    #[arg(long)]
    spotlight_url: Option<String>,

    /// Confidence threshold passed to the linking service
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Necessity threshold: entities scoring strictly above it keep their
    /// explanation out of the text
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Shows detailed process and debug info
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose { "debug" } else { "info" })
        .init();

    let mut config = LinkerConfig::with_data_dir(&args.data_dir);
    if let Some(url) = &args.spotlight_url {
        config.spotlight_url = url.clone();
    }

    let corpus = read_corpus(&args.path)
        .with_context(|| format!("could not read corpus at '{}'", args.path.display()))?;
    info!(documents = corpus.len(), "corpus loaded");

    // Fatal when the linking service is unreachable or data files are
    // missing: that is a misconfiguration, not a transient fault.
    let mut linker = EntityLinker::from_config(&config)?;

    let output_path = config.output_path();
    let mut output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output_path)
        .with_context(|| format!("could not open output at '{}'", output_path.display()))?;

    let mut count_with = 0usize;
    let mut count_without = 0usize;

    for (i, text) in corpus.iter().enumerate() {
        if count_with >= args.target && count_without >= args.target {
            info!(target = args.target, "target reached");
            break;
        }

        if i % 100 == 0 {
            info!(document = i, total = corpus.len(), count_with, count_without, "progress");
        }

        let outcome = linker.resolve(text, args.confidence);
        if outcome.status != LinkStatus::Ok {
            continue;
        }

        let result = match linker.annotate(&outcome, text, args.threshold) {
            Ok(result) => result,
            // A scoring invariant violation is loud but local: log it and
            // move on, one bad document must not abort the run.
            Err(err) => {
                warn!(document = i, error = %err, "skipping document");
                continue;
            }
        };

        // Only documents that produced at least one decision are
        // interesting for validation
        if result.annotated_entities.is_empty() && result.ignored_entities.is_empty() {
            continue;
        }

        if !result.annotated_entities.is_empty() {
            count_with += 1;
        } else {
            count_without += 1;
        }

        // One JSON record per line: appendable, and each line parses on
        // its own so partial output stays usable.
        writeln!(output, "{}", serde_json::to_string(&result)?)?;
    }

    info!(count_with, count_without, output = %output_path.display(), "run finished");
    Ok(())
}

/// Reads a corpus file: documents are separated by blank lines, and
/// newlines within a document are flattened to spaces. This matches the
/// raw DutchWebCorpus text format.
fn read_corpus(path: &Path) -> anyhow::Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw.split("\n\n").map(|doc| doc.replace('\n', " ")).collect())
}
