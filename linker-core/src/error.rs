//! Error type shared by all pipeline stages.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading resources, talking to the external
/// services or scoring entities.
///
/// Most of these never cross the batch boundary: the resolver catches
/// service failures itself and degrades to an empty result, so a single
/// bad document cannot abort a corpus run. The exceptions are the startup
/// checks (missing data files, unreachable linking service), which are
/// precondition failures and should stop the program immediately.
#[derive(Debug, Error)]
pub enum LinkerError {
    /// The linking service did not answer the startup probe.
    #[error("linking service appears unreachable at '{url}': {reason}. Is the server running and is the url correct?")]
    ServiceUnreachable { url: String, reason: String },

    /// The linking service answered but found no entities in the text.
    #[error("no entities found by the linking service")]
    NoEntities,

    /// An HTTP request to one of the external services failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A data file could not be read or written.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A binary data file could not be encoded or decoded.
    #[error("could not (de)serialize '{path}': {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// A malformed line was found in the word vector file.
    #[error("malformed vector on line {line} of '{path}'")]
    MalformedVector { path: PathBuf, line: usize },

    /// All context sentences for an entity cleaned down to nothing, so
    /// there is nothing to average a similarity over. Empirically this
    /// does not happen (a valid context window always contains at least
    /// the center sentence), but if it ever does we want a loud failure
    /// instead of a division by zero.
    #[error("no usable context sentences for entity '{0}'")]
    EmptyCleanContext(String),
}

impl LinkerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LinkerError::Io { path: path.into(), source }
    }

    pub(crate) fn codec(path: impl Into<PathBuf>, source: bincode::Error) -> Self {
        LinkerError::Codec { path: path.into(), source }
    }
}
