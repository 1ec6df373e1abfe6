//! System memory sampling.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Source of system memory usage readings.
pub trait MemoryProbe: Send + Sync + fmt::Debug {
    /// Used memory as a percentage of total, or `None` when no reading is available.
    fn usage_percent(&self) -> Option<f64>;
}

/// Reads usage from `/proc/meminfo`.
///
/// Usage is `(MemTotal - MemAvailable) / MemTotal`. Kernels without
/// `MemAvailable` fall back to `MemFree + Buffers + Cached`. Where the file is
/// absent (non-Linux hosts) the probe reports no reading.
#[derive(Debug, Clone)]
pub struct SystemMemoryProbe {
    meminfo_path: PathBuf,
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self { meminfo_path: PathBuf::from("/proc/meminfo") }
    }
}

impl SystemMemoryProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe reading a meminfo-formatted file at another location.
    #[must_use]
    pub fn with_meminfo_path(path: impl Into<PathBuf>) -> Self {
        Self { meminfo_path: path.into() }
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn usage_percent(&self) -> Option<f64> {
        match std::fs::read_to_string(&self.meminfo_path) {
            Ok(content) => parse_meminfo_usage(&content),
            Err(e) => {
                trace!(path = %self.meminfo_path.display(), error = %e, "No memory reading");
                None
            }
        }
    }
}

fn meminfo_kb(content: &str, field: &str) -> Option<u64> {
    content
        .lines()
        .find(|line| line.strip_prefix(field).is_some_and(|rest| rest.starts_with(':')))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|value| value.parse::<u64>().ok())
}

/// Used-memory percentage from `/proc/meminfo` content.
#[must_use]
pub fn parse_meminfo_usage(content: &str) -> Option<f64> {
    let total = meminfo_kb(content, "MemTotal")?;
    if total == 0 {
        return None;
    }
    let available = meminfo_kb(content, "MemAvailable").or_else(|| {
        let free = meminfo_kb(content, "MemFree")?;
        let buffers = meminfo_kb(content, "Buffers").unwrap_or(0);
        let cached = meminfo_kb(content, "Cached").unwrap_or(0);
        Some(free + buffers + cached)
    })?;
    let used = total.saturating_sub(available);
    Some(used as f64 / total as f64 * 100.0)
}

/// A settable probe for deterministic tests and embedding hosts that track
/// memory themselves.
#[derive(Debug)]
pub struct FixedMemoryProbe {
    bits: AtomicU64,
}

impl FixedMemoryProbe {
    #[must_use]
    pub fn new(percent: f64) -> Self {
        Self { bits: AtomicU64::new(percent.to_bits()) }
    }

    /// A probe that never has a reading.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(f64::NAN)
    }

    pub fn set(&self, percent: f64) {
        self.bits.store(percent.to_bits(), Ordering::SeqCst);
    }
}

impl MemoryProbe for FixedMemoryProbe {
    fn usage_percent(&self) -> Option<f64> {
        let value = f64::from_bits(self.bits.load(Ordering::SeqCst));
        (!value.is_nan()).then_some(value)
    }
}
