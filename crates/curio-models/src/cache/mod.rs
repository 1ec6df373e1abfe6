//! Artifact caching with memory-pressure eviction.
//!
//! Artifacts are loaded lazily on first request and shared as `Arc`s. Before
//! each load the cache samples memory usage and runs a reclaim pass above the
//! high-water mark; after a load the configured eviction strategy decides
//! what to drop.

pub mod cache;
pub mod config;
pub mod types;

pub use cache::ModelCache;
pub use config::{CacheConfig, CacheConfigError, EvictionStrategy};
pub use types::{CacheKey, CacheStats, CachedArtifact};
