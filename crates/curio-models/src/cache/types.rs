//! Core data types for artifact caching.

use curio_artifacts::Artifact;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Cache key: a model category plus a file inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Category name, e.g. `movies.knn`.
    pub category: String,
    /// File name inside the category directory.
    pub file: String,
}

impl CacheKey {
    pub fn new(category: impl Into<String>, file: impl Into<String>) -> Self {
        Self { category: category.into(), file: file.into() }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.file)
    }
}

/// A cached artifact entry with metadata.
#[derive(Clone)]
pub struct CachedArtifact {
    /// The cached artifact, shared with every caller that loaded it.
    pub artifact: Arc<Artifact>,
    /// Timestamp of last access.
    pub last_accessed: Instant,
    /// Number of times this artifact has been handed out.
    pub access_count: u64,
    /// Timestamp when the artifact was first cached.
    pub created_at: Instant,
}

impl CachedArtifact {
    /// Create a new entry with the current timestamp and an access count of 1.
    pub fn new(artifact: Arc<Artifact>) -> Self {
        let now = Instant::now();
        Self { artifact, last_accessed: now, access_count: 1, created_at: now }
    }

    /// Update the last accessed timestamp and increment access count.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

impl fmt::Debug for CachedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedArtifact")
            .field("kind", &self.artifact.kind())
            .field("last_accessed", &self.last_accessed)
            .field("access_count", &self.access_count)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Cache statistics for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total number of cache hits.
    pub total_hits: u64,
    /// Total number of cache misses.
    pub total_misses: u64,
    /// Total number of entries dropped by the eviction strategy.
    pub total_evictions: u64,
    /// Total number of loads that failed (unknown category, missing or corrupt file).
    pub total_load_failures: u64,
    /// Number of reclaim passes run.
    pub reclaim_passes: u64,
    /// Current number of cached artifacts.
    pub cache_size: usize,
}
