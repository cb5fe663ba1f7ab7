//! # Explanation cache
//!
//! Many entities recur across a corpus, and the summary api should not be
//! hammered for the same article over and over. This cache maps article
//! title → summary response and is persisted **on every insert**. That
//! write-through policy trades throughput for crash safety: a killed batch
//! run loses at most the summary currently in flight, never the ones
//! already fetched. Entries are never evicted; the cache only grows.
//!
//! Storage is behind the [`CacheStore`] trait so the resolver can be
//! tested with a purely in-memory backend.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use tracing::warn;

use crate::error::LinkerError;
use crate::wikipedia::WikiSummary;

/// Backing storage for the cache: load once at startup, persist the full
/// map after every change.
pub trait CacheStore {
    fn load(&self) -> Result<HashMap<String, WikiSummary>, LinkerError>;
    fn persist(&self, entries: &HashMap<String, WikiSummary>) -> Result<(), LinkerError>;
}

/// Bincode file storage, the production backend.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<HashMap<String, WikiSummary>, LinkerError> {
        if !self.path.is_file() {
            warn!(path = %self.path.display(), "no explanation cache found, creating a new one");
            let empty = HashMap::new();
            self.persist(&empty)?;
            return Ok(empty);
        }

        let file = File::open(&self.path).map_err(|e| LinkerError::io(&self.path, e))?;
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| LinkerError::codec(&self.path, e))
    }

    fn persist(&self, entries: &HashMap<String, WikiSummary>) -> Result<(), LinkerError> {
        let file = File::create(&self.path).map_err(|e| LinkerError::io(&self.path, e))?;
        bincode::serialize_into(BufWriter::new(file), entries)
            .map_err(|e| LinkerError::codec(&self.path, e))
    }
}

/// No-op storage for tests and one-off runs: nothing survives the process.
pub struct MemoryStore;

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<HashMap<String, WikiSummary>, LinkerError> {
        Ok(HashMap::new())
    }

    fn persist(&self, _entries: &HashMap<String, WikiSummary>) -> Result<(), LinkerError> {
        Ok(())
    }
}

/// The process-lifetime cache itself: an in-memory map plus its store.
pub struct ExplanationCache {
    entries: HashMap<String, WikiSummary>,
    store: Box<dyn CacheStore>,
}

impl ExplanationCache {
    /// Loads all entries from the given store.
    pub fn open(store: Box<dyn CacheStore>) -> Result<Self, LinkerError> {
        let entries = store.load()?;
        Ok(Self { entries, store })
    }

    /// An empty cache that never touches disk.
    pub fn in_memory() -> Self {
        Self { entries: HashMap::new(), store: Box::new(MemoryStore) }
    }

    pub fn get(&self, title: &str) -> Option<&WikiSummary> {
        self.entries.get(title)
    }

    /// Inserts a summary and immediately persists the whole map.
    pub fn insert(&mut self, title: String, summary: WikiSummary) -> Result<(), LinkerError> {
        self.entries.insert(title, summary);
        self.store.persist(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(description: &str) -> WikiSummary {
        WikiSummary {
            title: "t".to_string(),
            description: description.to_string(),
            extract: "e.".to_string(),
        }
    }

    #[test]
    fn test_in_memory_get_and_insert() {
        let mut cache = ExplanationCache::in_memory();
        assert!(cache.get("Groningen").is_none());

        cache.insert("Groningen".to_string(), summary("stad")).unwrap();
        assert_eq!(cache.get("Groningen").unwrap().description, "stad");
    }

    #[test]
    fn test_cache_only_grows() {
        let mut cache = ExplanationCache::in_memory();
        cache.insert("A".to_string(), summary("a")).unwrap();
        cache.insert("B".to_string(), summary("b")).unwrap();
        assert_eq!(cache.len(), 2);

        // overwriting a title replaces the payload but never shrinks the map
        cache.insert("A".to_string(), summary("a2")).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A").unwrap().description, "a2");
    }

    #[test]
    fn test_file_store_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explanation_cache.bin");

        let cache = ExplanationCache::open(Box::new(FileStore::new(&path))).unwrap();
        assert!(cache.is_empty());
        assert!(path.is_file());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explanation_cache.bin");

        let mut cache = ExplanationCache::open(Box::new(FileStore::new(&path))).unwrap();
        cache.insert("Groningen".to_string(), summary("stad")).unwrap();
        drop(cache);

        let reopened = ExplanationCache::open(Box::new(FileStore::new(&path))).unwrap();
        assert_eq!(reopened.get("Groningen").unwrap().description, "stad");
    }
}
