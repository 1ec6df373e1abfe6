//! One recommender family: resolve, rank, sample.

use crate::catalog::DegradedPolicy;
use crate::rankers::{RankSession, Ranker};
use crate::resolver::{resolve, MatchPolicy};
use crate::sampling::SamplingPolicy;
use curio_abstraction::{
    FamilyId, RankError, RecommendParams, Recommendations, Recommender, TitleBatch, TitleOutcome,
};
use curio_models::ModelCache;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, warn};

/// A title-based recommender family built from a ranker and its policies.
#[derive(Debug)]
pub struct FamilyRecommender {
    id: FamilyId,
    models: Arc<ModelCache>,
    ranker: Box<dyn Ranker>,
    matching: MatchPolicy,
    sampling: SamplingPolicy,
    degraded: DegradedPolicy,
}

impl FamilyRecommender {
    pub fn new(
        id: FamilyId,
        models: Arc<ModelCache>,
        ranker: Box<dyn Ranker>,
        matching: MatchPolicy,
        sampling: SamplingPolicy,
        degraded: DegradedPolicy,
    ) -> Self {
        Self { id, models, ranker, matching, sampling, degraded }
    }

    /// Artifact category the family reads from.
    #[must_use]
    pub fn category(&self) -> &str {
        self.ranker.category()
    }

    /// Name of the ranker behind the family.
    #[must_use]
    pub fn ranker_name(&self) -> &'static str {
        self.ranker.name()
    }

    #[must_use]
    pub const fn matching(&self) -> MatchPolicy {
        self.matching
    }

    #[must_use]
    pub const fn sampling(&self) -> SamplingPolicy {
        self.sampling
    }

    #[must_use]
    pub const fn degraded(&self) -> DegradedPolicy {
        self.degraded
    }

    fn degrade(
        &self,
        titles: &TitleBatch,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Recommendations {
        let mut results = Recommendations::new(self.id.domain);
        for title in titles.iter() {
            results.insert(title.as_str(), self.degraded.outcome(n, rng));
        }
        results
    }

    fn recommend_one(
        &self,
        session: &dyn RankSession,
        title: &str,
        params: &RecommendParams,
        rng: &mut dyn RngCore,
    ) -> TitleOutcome {
        let outcome = session.titles().and_then(|index| {
            let Some(query) = resolve(index, title, self.matching) else {
                return Ok(None);
            };
            let width = self.sampling.candidate_width(params.n, params.pool_size);
            let candidates = session.rank(query, width, rng)?;
            let names = candidates
                .iter()
                .map(|&pos| {
                    index
                        .title(pos)
                        .map(str::to_string)
                        .ok_or(RankError::IndexOutOfRange { index: pos, len: index.len() })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(self.sampling.select(&names, params.n, rng)))
        });

        match outcome {
            Ok(Some(titles)) => TitleOutcome::Recommended(titles),
            Ok(None) => {
                debug!(family = %self.id, title, "Title not found");
                TitleOutcome::NotFound
            }
            Err(e) => {
                warn!(family = %self.id, title, error = %e, "Ranking failed");
                TitleOutcome::Failed(format!("Error processing '{title}': {e}"))
            }
        }
    }
}

impl Recommender for FamilyRecommender {
    fn family(&self) -> &FamilyId {
        &self.id
    }

    fn recommend(
        &self,
        titles: &TitleBatch,
        params: &RecommendParams,
        rng: &mut dyn RngCore,
    ) -> Recommendations {
        let Some(session) = self.ranker.load(&self.models) else {
            warn!(family = %self.id, ranker = self.ranker.name(), "Model artifacts unavailable");
            return self.degrade(titles, params.n, rng);
        };

        let mut results = Recommendations::new(self.id.domain);
        for title in titles.iter() {
            let outcome = self.recommend_one(session.as_ref(), title, params, rng);
            results.insert(title.as_str(), outcome);
        }
        results
    }
}
