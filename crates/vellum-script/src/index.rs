//! Thin handle to the host's query index.
//!
//! The index proper (parsing, caching, file watching) lives in the host;
//! views hold this handle so scripts can read page metadata and so the
//! refresh scheduler has a revision to compare against.

use dashmap::DashMap;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, concurrently-updated view of indexed page metadata.
#[derive(Debug, Default)]
pub struct QueryIndex {
    revision: AtomicU64,
    pages: DashMap<String, JsonValue>,
}

impl QueryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision, bumped on every index mutation. The refresh
    /// scheduler uses this to decide which views are dirty.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Bump the revision without changing page data. Returns the new value.
    pub fn touch(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Insert or replace a page's metadata.
    pub fn insert_page(&self, path: impl Into<String>, metadata: JsonValue) {
        self.pages.insert(path.into(), metadata);
        self.touch();
    }

    /// Remove a page. No-op if absent.
    pub fn remove_page(&self, path: &str) {
        if self.pages.remove(path).is_some() {
            self.touch();
        }
    }

    /// Metadata for a page, if indexed.
    pub fn page(&self, path: &str) -> Option<JsonValue> {
        self.pages.get(path).map(|entry| entry.value().clone())
    }

    /// All indexed page paths, sorted for deterministic output.
    pub fn pages(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.pages.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }
}
