//! Artifact loading for Curio.
//!
//! This crate owns the process-wide model cache: artifacts are loaded lazily
//! from an artifact root, shared as `Arc<Artifact>`, and evicted when system
//! memory crosses the configured marks.
//!
//! # Eviction strategies
//!
//! - **clear_all_on_threshold** (default): drop everything above the critical mark
//! - **lru**: keep at most `max_entries` artifacts
//! - **never**: keep everything for the process lifetime

pub mod cache;
pub mod config;
pub mod memory;

pub use cache::{
    CacheConfig, CacheConfigError, CacheKey, CacheStats, CachedArtifact, EvictionStrategy,
    ModelCache,
};
pub use config::{load_cache_config, read_config_section, ConfigLoadError};
pub use memory::{FixedMemoryProbe, MemoryProbe, SystemMemoryProbe};
