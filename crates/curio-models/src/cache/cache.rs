//! ModelCache implementation with lazy loading and memory-pressure eviction.

use crate::memory::{MemoryProbe, SystemMemoryProbe};
use curio_artifacts::{
    read_artifact, Artifact, ArtifactError, ArtifactLayout, ArtifactRegistry, CategorySpec,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

use super::config::{CacheConfig, CacheConfigError, EvictionStrategy};
use super::types::{CacheKey, CacheStats, CachedArtifact};

type CacheMap = HashMap<CacheKey, CachedArtifact>;

/// Artifact cache shared by every recommender.
///
/// Artifacts are loaded on first request and kept until an eviction strategy
/// or a manual `clear`/`remove` drops them. Loading never surfaces an error:
/// every failure is logged and reported as `None`.
#[derive(Debug)]
pub struct ModelCache {
    /// The cache storage (key -> cached artifact).
    cache: Arc<RwLock<CacheMap>>,
    /// Cache configuration.
    config: CacheConfig,
    /// Cache statistics.
    stats: Arc<RwLock<CacheStats>>,
    /// Categories this cache can load.
    registry: ArtifactRegistry,
    /// Where category directories live.
    layout: ArtifactLayout,
    /// Memory usage source.
    probe: Arc<dyn MemoryProbe>,
}

impl ModelCache {
    /// Create a new cache reading system memory from `/proc/meminfo`.
    ///
    /// # Errors
    /// Returns `CacheConfigError` if the configuration is invalid.
    pub fn new(
        layout: ArtifactLayout,
        registry: ArtifactRegistry,
        config: CacheConfig,
    ) -> Result<Self, CacheConfigError> {
        Self::with_probe(layout, registry, config, Arc::new(SystemMemoryProbe::new()))
    }

    /// Create a new cache with an explicit memory probe.
    ///
    /// # Errors
    /// Returns `CacheConfigError` if the configuration is invalid.
    pub fn with_probe(
        layout: ArtifactLayout,
        registry: ArtifactRegistry,
        config: CacheConfig,
        probe: Arc<dyn MemoryProbe>,
    ) -> Result<Self, CacheConfigError> {
        config.validate()?;

        Ok(Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            config,
            stats: Arc::new(RwLock::new(CacheStats::default())),
            registry,
            layout,
            probe,
        })
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, CacheMap> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, CacheMap> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_stats(&self) -> RwLockWriteGuard<'_, CacheStats> {
        self.stats.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get an artifact from cache, loading it from disk if not present.
    ///
    /// Returns `None` when the category is unknown, the file is missing, the
    /// file cannot be deserialized or holds a different kind than declared.
    pub fn get_model(&self, category: &str, file: &str) -> Option<Arc<Artifact>> {
        let cache_key = CacheKey::new(category, file);

        if self.config.enabled {
            let mut cache = self.write_cache();
            if let Some(cached) = cache.get_mut(&cache_key) {
                cached.touch();
                let artifact = Arc::clone(&cached.artifact);
                drop(cache);
                self.write_stats().total_hits += 1;
                debug!(category, file, "Cache hit");
                return Some(artifact);
            }
        }

        self.write_stats().total_misses += 1;
        debug!(category, file, "Cache miss, loading artifact");

        let Some(spec) = self.registry.category(category) else {
            error!(category, file, "Unknown model category");
            self.write_stats().total_load_failures += 1;
            return None;
        };

        if let Some(usage) = self.probe.usage_percent() {
            if usage > self.config.high_water_percent {
                warn!(
                    category,
                    file,
                    usage,
                    high_water = self.config.high_water_percent,
                    "Memory usage above high-water mark, reclaiming before load"
                );
                self.reclaim();
            }
        }

        let artifact = match self.load(spec, file) {
            Ok(artifact) => Arc::new(artifact),
            Err(ArtifactError::MissingFile(path)) => {
                warn!(category, file, path = %path.display(), "Model file not found");
                self.write_stats().total_load_failures += 1;
                return None;
            }
            Err(e) => {
                error!(category, file, error = %e, "Failed to load model");
                self.write_stats().total_load_failures += 1;
                self.reclaim();
                return None;
            }
        };

        if !self.config.enabled {
            info!(category, file, kind = %artifact.kind(), "Loaded model (caching disabled)");
            return Some(artifact);
        }

        let cache_size = {
            let mut cache = self.write_cache();
            cache.insert(cache_key, CachedArtifact::new(Arc::clone(&artifact)));
            cache.len()
        };
        self.write_stats().cache_size = cache_size;

        info!(
            category,
            file,
            kind = %artifact.kind(),
            usage = ?self.probe.usage_percent(),
            "Model cached"
        );

        self.apply_eviction();

        Some(artifact)
    }

    fn load(&self, spec: &CategorySpec, file: &str) -> Result<Artifact, ArtifactError> {
        let path = self.layout.file_path(spec, file)?;
        let artifact = read_artifact(&path)?;
        if let Some(expected) = spec.declared_kind(file) {
            if artifact.kind() != expected {
                return Err(ArtifactError::KindMismatch { expected, found: artifact.kind() });
            }
        }
        Ok(artifact)
    }

    fn apply_eviction(&self) {
        match self.config.eviction {
            EvictionStrategy::Never => {}
            EvictionStrategy::ClearAllOnThreshold => {
                let Some(usage) = self.probe.usage_percent() else {
                    return;
                };
                if usage > self.config.critical_percent {
                    warn!(
                        usage,
                        critical = self.config.critical_percent,
                        "Memory usage above critical mark, clearing model cache"
                    );
                    let evicted = {
                        let mut cache = self.write_cache();
                        let evicted = cache.len();
                        cache.clear();
                        evicted
                    };
                    {
                        let mut stats = self.write_stats();
                        stats.total_evictions += evicted as u64;
                        stats.cache_size = 0;
                    }
                    self.reclaim();
                }
            }
            EvictionStrategy::Lru { max_entries } => {
                let mut cache = self.write_cache();
                while cache.len() > max_entries {
                    let Some(lru_key) = Self::find_lru_key(&cache) else {
                        break;
                    };
                    cache.remove(&lru_key);
                    let mut stats = self.write_stats();
                    stats.total_evictions += 1;
                    stats.cache_size = cache.len();
                    drop(stats);
                    info!(
                        category = %lru_key.category,
                        file = %lru_key.file,
                        "Evicted LRU model from cache"
                    );
                }
            }
        }
    }

    /// Find the least-recently-used key in the cache.
    fn find_lru_key(cache: &CacheMap) -> Option<CacheKey> {
        cache
            .iter()
            .min_by_key(|(_, cached)| cached.last_accessed)
            .map(|(key, _)| key.clone())
    }

    /// Release spare storage held by the cache and record the pass.
    fn reclaim(&self) {
        self.write_cache().shrink_to_fit();
        self.write_stats().reclaim_passes += 1;
        info!(usage = ?self.probe.usage_percent(), "Reclaim pass complete");
    }

    /// Whether at least one declared file of `category` exists on disk.
    ///
    /// Does not load anything.
    #[must_use]
    pub fn is_available(&self, category: &str) -> bool {
        self.registry
            .category(category)
            .is_some_and(|spec| spec.any_file_present(&self.layout))
    }

    /// Get current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut result = self.stats.read().unwrap_or_else(PoisonError::into_inner).clone();
        result.cache_size = self.read_cache().len();
        result
    }

    /// Number of cached artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_cache().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all artifacts from the cache.
    pub fn clear(&self) {
        let cleared_count = {
            let mut cache = self.write_cache();
            let count = cache.len();
            cache.clear();
            count
        };
        self.write_stats().cache_size = 0;
        info!(cleared_count, "Cleared all models from cache");
    }

    /// Remove a specific artifact from the cache.
    ///
    /// Returns `true` if the artifact was removed, `false` if it was not cached.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let mut cache = self.write_cache();
        let removed = cache.remove(key).is_some();
        if removed {
            self.write_stats().cache_size = cache.len();
            drop(cache);
            info!(category = %key.category, file = %key.file, "Removed model from cache");
        }
        removed
    }

    /// Get the cache configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    #[must_use]
    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }
}
