//! Turning a ranked candidate list into the final `n` results.

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How many ranked candidates a family draws its results from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// The first `n` candidates in rank order.
    Strict,
    /// `n` candidates drawn uniformly without replacement from the top `size`.
    Pool {
        /// Width of the candidate pool.
        size: usize,
    },
    /// Like `Pool`, with the width scaled to `factor * n`.
    ScaledPool {
        /// Pool width per requested result.
        factor: usize,
    },
}

impl SamplingPolicy {
    /// Number of ranked candidates to request for `n` results.
    ///
    /// `pool_override` replaces the pool width of pooled policies; strict
    /// policies ignore it.
    #[must_use]
    pub fn candidate_width(self, n: usize, pool_override: Option<usize>) -> usize {
        match (self, pool_override) {
            (Self::Strict, _) => n,
            (Self::Pool { .. } | Self::ScaledPool { .. }, Some(size)) => size,
            (Self::Pool { size }, None) => size,
            (Self::ScaledPool { factor }, None) => factor.saturating_mul(n),
        }
    }

    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Pick the final results from `candidates` (already limited to the
    /// candidate width). Fewer than `n` candidates yields all of them.
    pub fn select<T: Clone>(self, candidates: &[T], n: usize, rng: &mut dyn RngCore) -> Vec<T> {
        if self.is_strict() || candidates.len() <= n {
            return candidates.iter().take(n).cloned().collect();
        }
        candidates.choose_multiple(rng, n).cloned().collect()
    }
}

/// Uniform sample of up to `n` entries of a fixed list.
pub fn sample_titles(titles: &[&str], n: usize, rng: &mut dyn RngCore) -> Vec<String> {
    titles
        .choose_multiple(rng, n.min(titles.len()))
        .map(|title| (*title).to_string())
        .collect()
}
