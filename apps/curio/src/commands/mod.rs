//! Command implementations for the Curio CLI.

pub mod genres;
pub mod probe;
pub mod recommend;

use anyhow::{Context, Result};
use curio_recommend::RecommendationService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

/// Open the recommendation service over an artifact root.
pub fn open_service(root: &Path) -> Result<RecommendationService> {
    RecommendationService::open(root)
        .with_context(|| format!("Failed to open artifact root {}", root.display()))
}

/// Sampling source: seeded when reproducibility is requested.
pub fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
