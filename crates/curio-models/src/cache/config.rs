//! Configuration for artifact caching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the cache drops after a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum EvictionStrategy {
    /// Never evict automatically.
    Never,
    /// Drop every cached artifact once usage passes `critical_percent`.
    #[default]
    ClearAllOnThreshold,
    /// Drop least-recently-used artifacts beyond `max_entries`.
    Lru {
        /// Maximum number of cached artifacts.
        max_entries: usize,
    },
}

/// Configuration for the artifact cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Whether loaded artifacts are kept in memory.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Memory usage (percent) above which a reclaim pass runs before a load (default: 80).
    #[serde(default = "default_high_water_percent")]
    pub high_water_percent: f64,

    /// Memory usage (percent) above which clear-all eviction triggers (default: 90).
    #[serde(default = "default_critical_percent")]
    pub critical_percent: f64,

    /// Eviction strategy applied after each successful load.
    #[serde(default)]
    pub eviction: EvictionStrategy,
}

fn default_enabled() -> bool {
    true
}

fn default_high_water_percent() -> f64 {
    80.0
}

fn default_critical_percent() -> f64 {
    90.0
}

/// Errors that can occur during cache configuration validation.
#[derive(Debug, Error)]
pub enum CacheConfigError {
    /// High-water mark outside (0, 100].
    #[error("Invalid high-water mark {0}: must be in (0, 100]")]
    InvalidHighWater(f64),

    /// Critical mark outside (0, 100].
    #[error("Invalid critical mark {0}: must be in (0, 100]")]
    InvalidCritical(f64),

    /// High-water mark above the critical mark.
    #[error("High-water mark {high_water} exceeds critical mark {critical}")]
    ThresholdOrder {
        /// Configured high-water mark.
        high_water: f64,
        /// Configured critical mark.
        critical: f64,
    },

    /// LRU strategy with room for no entries.
    #[error("Invalid LRU size: max_entries must be greater than 0")]
    InvalidMaxEntries,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            high_water_percent: default_high_water_percent(),
            critical_percent: default_critical_percent(),
            eviction: EvictionStrategy::default(),
        }
    }
}

fn valid_percent(value: f64) -> bool {
    value > 0.0 && value <= 100.0
}

impl CacheConfig {
    /// Validate the cache configuration.
    ///
    /// # Errors
    /// Returns `CacheConfigError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), CacheConfigError> {
        if !valid_percent(self.high_water_percent) {
            return Err(CacheConfigError::InvalidHighWater(self.high_water_percent));
        }

        if !valid_percent(self.critical_percent) {
            return Err(CacheConfigError::InvalidCritical(self.critical_percent));
        }

        if self.high_water_percent > self.critical_percent {
            return Err(CacheConfigError::ThresholdOrder {
                high_water: self.high_water_percent,
                critical: self.critical_percent,
            });
        }

        if self.eviction == (EvictionStrategy::Lru { max_entries: 0 }) {
            return Err(CacheConfigError::InvalidMaxEntries);
        }

        Ok(())
    }
}
