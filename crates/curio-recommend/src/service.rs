//! Recommendation service: every family over one shared model cache.

use crate::config::{load_recommend_config, RecommendConfig};
use crate::encoder::{default_encoder, HashingEncoder, TextEncoder};
use crate::families::FamilyFactory;
use crate::family::FamilyRecommender;
use crate::genre_filter::GenreFilterRecommender;
use curio_abstraction::{
    FamilyId, GenreFilterError, RecommendParams, Recommendations, Recommender, TitleBatch,
};
use curio_artifacts::{ArtifactLayout, ArtifactRegistry};
use curio_models::{load_cache_config, ConfigLoadError, ModelCache};
use rand::RngCore;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while routing a request to a family.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No family with this id is registered.
    #[error("Unknown recommender family: {0}")]
    UnknownFamily(String),

    /// The family recommends by genre, not by title.
    #[error("{0} recommends by genre; pass genres instead of titles")]
    NotTitleBased(FamilyId),
}

/// Runs any registered family against titles or genres.
#[derive(Debug)]
pub struct RecommendationService {
    models: Arc<ModelCache>,
    config: RecommendConfig,
    families: BTreeMap<FamilyId, FamilyRecommender>,
    genre_filter: GenreFilterRecommender,
}

impl RecommendationService {
    /// Service using the built-in hashing encoder.
    #[must_use]
    pub fn new(models: Arc<ModelCache>, config: RecommendConfig) -> Self {
        Self::with_encoder(models, config, Arc::new(HashingEncoder::default()))
    }

    /// Service using a custom text encoder for the embedding families.
    #[must_use]
    pub fn with_encoder(
        models: Arc<ModelCache>,
        config: RecommendConfig,
        encoder: Arc<dyn TextEncoder>,
    ) -> Self {
        let factory = FamilyFactory::new(Arc::clone(&models), encoder);
        let families = factory
            .movie_families()
            .into_iter()
            .chain(factory.book_families())
            .map(|family| (family.family().clone(), family))
            .collect::<BTreeMap<_, _>>();
        let genre_filter = factory.genre_filter();
        info!(families = families.len() + 1, "Recommendation service ready");
        Self { models, config, families, genre_filter }
    }

    /// Open an artifact root: read `.curio/config.toml`, build the cache over
    /// the standard categories and register every family. Embedding families
    /// use [`default_encoder`].
    ///
    /// # Errors
    /// Returns error if the config file exists but is unreadable or invalid.
    pub fn open(root: &Path) -> Result<Self, ConfigLoadError> {
        let cache_config = load_cache_config(root)?;
        let config = load_recommend_config(root)?;
        let models =
            ModelCache::new(ArtifactLayout::new(root), ArtifactRegistry::standard(), cache_config)
                .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        Ok(Self::with_encoder(Arc::new(models), config, default_encoder()))
    }

    #[must_use]
    pub fn models(&self) -> &Arc<ModelCache> {
        &self.models
    }

    #[must_use]
    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Every registered family id, the genre filter included.
    pub fn family_ids(&self) -> impl Iterator<Item = &FamilyId> {
        self.families.keys().chain(std::iter::once(self.genre_filter.family()))
    }

    #[must_use]
    pub fn family(&self, id: &FamilyId) -> Option<&FamilyRecommender> {
        self.families.get(id)
    }

    #[must_use]
    pub fn genre_filter(&self) -> &GenreFilterRecommender {
        &self.genre_filter
    }

    /// Whether any artifact of the family's category is on disk.
    #[must_use]
    pub fn is_available(&self, id: &FamilyId) -> bool {
        let category = if id == self.genre_filter.family() {
            self.genre_filter.category()
        } else {
            match self.families.get(id) {
                Some(family) => family.category(),
                None => return false,
            }
        };
        self.models.is_available(category)
    }

    /// Request parameters with configured defaults filled in.
    #[must_use]
    pub fn params(&self, id: &FamilyId, n: Option<usize>, pool_size: Option<usize>) -> RecommendParams {
        RecommendParams {
            n: n.unwrap_or(self.config.default_n),
            pool_size: pool_size.or_else(|| self.config.pool_size(&id.to_string())),
        }
    }

    /// Run a title-based family.
    ///
    /// # Errors
    /// Returns `ServiceError` if the family is unknown or is the genre filter.
    pub fn recommend(
        &self,
        id: &FamilyId,
        titles: &TitleBatch,
        n: Option<usize>,
        pool_size: Option<usize>,
        rng: &mut dyn RngCore,
    ) -> Result<Recommendations, ServiceError> {
        if id == self.genre_filter.family() {
            return Err(ServiceError::NotTitleBased(id.clone()));
        }
        let family = self
            .families
            .get(id)
            .ok_or_else(|| ServiceError::UnknownFamily(id.to_string()))?;
        let params = self.params(id, n, pool_size);
        debug!(family = %id, titles = titles.len(), n = params.n, "Recommending");
        Ok(family.recommend(titles, &params, rng))
    }

    /// Run the genre filter.
    ///
    /// # Errors
    /// Returns the filter's structured error.
    pub fn recommend_by_genres(
        &self,
        genres: &[&str],
        n: Option<usize>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, GenreFilterError> {
        self.genre_filter
            .recommend_by_genres(genres, n.unwrap_or(self.config.default_n), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyOverride;
    use crate::test_support::{titles, Fixture};
    use curio_abstraction::TitleOutcome;
    use curio_artifacts::{categories, files};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn service(fixture: &Fixture) -> RecommendationService {
        let mut config = RecommendConfig::default();
        config
            .families
            .insert("movies.knn".to_string(), FamilyOverride { pool_size: Some(7) });
        RecommendationService::new(Arc::clone(&fixture.models), config)
    }

    #[test]
    fn test_family_ids_cover_standard_registry() {
        let fixture = Fixture::new();
        let service = service(&fixture);
        let ids: Vec<String> = service.family_ids().map(ToString::to_string).collect();
        assert_eq!(ids.len(), 12);
        assert!(ids.contains(&"movies.grhr".to_string()));
        assert!(ids.contains(&"books.embeddings".to_string()));
    }

    #[test]
    fn test_params_use_configured_defaults() {
        let fixture = Fixture::new();
        let service = service(&fixture);
        let knn: FamilyId = "movies.knn".parse().unwrap();
        let tfidf: FamilyId = "movies.tfidf".parse().unwrap();

        assert_eq!(service.params(&knn, None, None), RecommendParams { n: 5, pool_size: Some(7) });
        assert_eq!(service.params(&knn, Some(2), Some(9)).pool_size, Some(9));
        assert_eq!(service.params(&tfidf, None, None).pool_size, None);
    }

    #[test]
    fn test_routing_errors() {
        let fixture = Fixture::new();
        let service = service(&fixture);
        let mut rng = StdRng::seed_from_u64(0);
        let batch = TitleBatch::from("Heat");

        let grhr: FamilyId = "movies.grhr".parse().unwrap();
        assert!(matches!(
            service.recommend(&grhr, &batch, None, None, &mut rng),
            Err(ServiceError::NotTitleBased(_))
        ));

        let unknown = FamilyId::new(curio_abstraction::Domain::Books, "tfidf");
        assert_eq!(
            service.recommend(&unknown, &batch, None, None, &mut rng),
            Err(ServiceError::UnknownFamily("books.tfidf".to_string()))
        );
    }

    #[test]
    fn test_availability_and_degraded_movies() {
        let fixture = Fixture::new();
        let service = service(&fixture);
        let mut rng = StdRng::seed_from_u64(0);
        let knn: FamilyId = "movies.knn".parse().unwrap();

        assert!(!service.is_available(&knn));
        let results = service.recommend(&knn, &"Heat".into(), None, None, &mut rng).unwrap();
        assert_eq!(results.get("Heat"), Some(&TitleOutcome::Unavailable));

        fixture.write(categories::MOVIES_KNN, files::MOVIE_MAPPING, titles(&["Heat"]));
        assert!(service.is_available(&knn));
    }
}
