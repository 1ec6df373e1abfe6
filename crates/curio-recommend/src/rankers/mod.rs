//! Candidate ranking strategies.
//!
//! A [`Ranker`] knows which artifacts a family needs and fetches them through
//! the model cache. Once loaded it yields a [`RankSession`] that resolves
//! titles and ranks candidates for any number of queries.

pub mod cosine;
pub mod embedding;
pub mod knn;

pub use cosine::{CosineFeatures, CosineRanker};
pub use embedding::EmbeddingRanker;
pub use knn::{KnnQuery, SparseKnnRanker};

use curio_abstraction::RankError;
use curio_artifacts::{Artifact, ArtifactError, ArtifactResult, TitleIndex};
use curio_models::ModelCache;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

/// Loads a family's artifacts.
pub trait Ranker: Send + Sync + fmt::Debug {
    /// Short ranker name for logs.
    fn name(&self) -> &'static str;

    /// Artifact category the ranker reads from.
    fn category(&self) -> &str;

    /// Fetch every artifact the ranker needs. `None` when any of them is
    /// unavailable or has an unexpected shape.
    fn load(&self, models: &ModelCache) -> Option<Box<dyn RankSession>>;
}

/// Loaded artifacts ready to rank candidates.
pub trait RankSession {
    /// Titles addressable by this session.
    fn titles(&self) -> Result<&TitleIndex, RankError>;

    /// Up to `width` candidate positions for the item at `query`, best first.
    /// The query item itself is never returned.
    fn rank(
        &self,
        query: usize,
        width: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, RankError>;
}

/// Fetch one artifact and check it can be viewed as `T`.
pub(crate) fn fetch<T: ?Sized>(
    models: &ModelCache,
    category: &str,
    file: &str,
    view: impl Fn(&Artifact) -> ArtifactResult<&T>,
) -> Option<Arc<Artifact>> {
    let artifact = models.get_model(category, file)?;
    match view(&artifact) {
        Ok(_) => Some(artifact),
        Err(e) => {
            tracing::error!(category, file, error = %e, "Artifact has unexpected shape");
            None
        }
    }
}

/// A loaded artifact no longer matches the view its session expects.
pub(crate) fn shape_error(e: ArtifactError) -> RankError {
    RankError::MalformedFeatures(e.to_string())
}

/// Sort `(position, score)` pairs by descending score, ties by position.
pub(crate) fn sort_by_score(scored: &mut [(usize, f32)]) {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}
