//! The standard book and movie families.
//!
//! Each family pairs a ranker over its artifact category with a match
//! policy, a sampling policy and a degraded-data policy.
//!
//! `books.genre_based` samples from the 50 most similar books. The Python
//! service shuffled its whole ranked list, so in practice it drew from every
//! book; the pool keeps results tied to the query's categories and can be
//! widened per family with `pool_size` in `[recommend.families]`.

use crate::catalog::{DegradedPolicy, EXTENDED_BOOKS, GENERIC_BOOKS};
use crate::encoder::TextEncoder;
use crate::family::FamilyRecommender;
use crate::genre_filter::GenreFilterRecommender;
use crate::rankers::{
    CosineFeatures, CosineRanker, EmbeddingRanker, KnnQuery, Ranker, SparseKnnRanker,
};
use crate::resolver::MatchPolicy;
use crate::sampling::SamplingPolicy;
use curio_abstraction::{Domain, FamilyId};
use curio_artifacts::{categories, files};
use curio_models::ModelCache;
use std::sync::Arc;
use tracing::debug;

/// Score noise added by the book embedding family.
pub const BOOK_EMBEDDING_JITTER: f32 = 0.01;

fn matrix(file: &str) -> KnnQuery {
    KnnQuery::Matrix { file: file.to_string() }
}

fn cosine_matrix(file: &str) -> CosineFeatures {
    CosineFeatures::Matrix { file: file.to_string() }
}

/// Builds the standard families over one model cache.
pub struct FamilyFactory {
    models: Arc<ModelCache>,
    encoder: Arc<dyn TextEncoder>,
}

impl FamilyFactory {
    pub fn new(models: Arc<ModelCache>, encoder: Arc<dyn TextEncoder>) -> Self {
        Self { models, encoder }
    }

    fn family(
        &self,
        domain: Domain,
        name: &str,
        ranker: Box<dyn Ranker>,
        matching: MatchPolicy,
        sampling: SamplingPolicy,
    ) -> FamilyRecommender {
        let degraded = match domain {
            Domain::Movies => DegradedPolicy::Unavailable,
            Domain::Books if name == "genre_based" => DegradedPolicy::Fallback(GENERIC_BOOKS),
            Domain::Books => DegradedPolicy::Fallback(EXTENDED_BOOKS),
        };
        let id = FamilyId::new(domain, name);
        debug!(family = %id, ranker = ranker.name(), ?sampling, "Registering family");
        FamilyRecommender::new(id, Arc::clone(&self.models), ranker, matching, sampling, degraded)
    }

    /// Every title-based movie family.
    #[must_use]
    pub fn movie_families(&self) -> Vec<FamilyRecommender> {
        use categories::{
            MOVIES_EMBEDDINGS, MOVIES_GENRE_BASED, MOVIES_KNN, MOVIES_KNN_GENRE, MOVIES_NN,
            MOVIES_TFIDF,
        };

        vec![
            self.family(
                Domain::Movies,
                "knn",
                Box::new(SparseKnnRanker::new(
                    MOVIES_KNN,
                    files::KNN_MODEL,
                    files::MOVIE_MAPPING,
                    matrix(files::SPARSE_MATRIX),
                )),
                MatchPolicy::Exact,
                SamplingPolicy::Pool { size: 20 },
            ),
            self.family(
                Domain::Movies,
                "tfidf",
                Box::new(SparseKnnRanker::new(
                    MOVIES_TFIDF,
                    files::TFIDF_NN_MODEL,
                    files::TFIDF_TITLES,
                    matrix(files::TFIDF_MATRIX),
                )),
                MatchPolicy::Exact,
                SamplingPolicy::Strict,
            ),
            self.family(
                Domain::Movies,
                "knn_genre",
                Box::new(SparseKnnRanker::new(
                    MOVIES_KNN_GENRE,
                    files::GENRE_KNN_MODEL,
                    files::GENRE_MOVIES,
                    KnnQuery::ItemGenres,
                )),
                MatchPolicy::Exact,
                SamplingPolicy::Pool { size: 25 },
            ),
            self.family(
                Domain::Movies,
                "genre_based",
                Box::new(CosineRanker::new(
                    MOVIES_GENRE_BASED,
                    files::GENRE_BASED_TITLES,
                    cosine_matrix(files::GENRE_BASED_MATRIX),
                )),
                MatchPolicy::Exact,
                SamplingPolicy::Pool { size: 25 },
            ),
            self.family(
                Domain::Movies,
                "embeddings",
                Box::new(EmbeddingRanker::new(
                    MOVIES_EMBEDDINGS,
                    files::MOVIES_TABLE,
                    files::MOVIE_EMBEDDINGS,
                    Arc::clone(&self.encoder),
                )),
                MatchPolicy::CaseInsensitive,
                SamplingPolicy::Strict,
            ),
            self.family(
                Domain::Movies,
                "nn",
                Box::new(CosineRanker::new(
                    MOVIES_NN,
                    files::FINAL_MOVIE_DATA,
                    CosineFeatures::ItemFeatures,
                )),
                MatchPolicy::CaseInsensitive,
                SamplingPolicy::Strict,
            ),
        ]
    }

    /// Every book family.
    #[must_use]
    pub fn book_families(&self) -> Vec<FamilyRecommender> {
        use categories::{BOOKS_EMBEDDINGS, BOOKS_GENRE_KNN, BOOKS_KNN, BOOKS_NN};

        vec![
            self.family(
                Domain::Books,
                "knn",
                Box::new(SparseKnnRanker::new(
                    BOOKS_KNN,
                    files::KNN_MODEL,
                    files::BOOK_MAPPING,
                    matrix(files::SPARSE_MATRIX),
                )),
                MatchPolicy::ExactThenContains,
                SamplingPolicy::Pool { size: 20 },
            ),
            self.family(
                Domain::Books,
                "genre_based",
                Box::new(CosineRanker::new(
                    BOOKS_GENRE_KNN,
                    files::BOOKS_DF,
                    cosine_matrix(files::CATEGORY_KNN_SPARSE),
                )),
                MatchPolicy::ExactThenContains,
                SamplingPolicy::Pool { size: 50 },
            ),
            self.family(
                Domain::Books,
                "knn_genre",
                Box::new(CosineRanker::new(
                    BOOKS_GENRE_KNN,
                    files::BOOKS_DF,
                    cosine_matrix(files::CATEGORY_KNN_SPARSE),
                )),
                MatchPolicy::ExactThenContains,
                SamplingPolicy::Pool { size: 25 },
            ),
            self.family(
                Domain::Books,
                "embeddings",
                Box::new(
                    EmbeddingRanker::new(
                        BOOKS_EMBEDDINGS,
                        files::BOOKS_TABLE,
                        files::BOOK_EMBEDDINGS,
                        Arc::clone(&self.encoder),
                    )
                    .with_jitter(BOOK_EMBEDDING_JITTER),
                ),
                MatchPolicy::CaseInsensitive,
                SamplingPolicy::ScaledPool { factor: 5 },
            ),
            self.family(
                Domain::Books,
                "nn",
                Box::new(CosineRanker::new(
                    BOOKS_NN,
                    files::FINAL_BOOK_DATA,
                    CosineFeatures::ItemFeatures,
                )),
                MatchPolicy::CaseInsensitive,
                SamplingPolicy::Strict,
            ),
        ]
    }

    /// The movie genre-filter family.
    #[must_use]
    pub fn genre_filter(&self) -> GenreFilterRecommender {
        GenreFilterRecommender::new(
            FamilyId::new(Domain::Movies, "grhr"),
            Arc::clone(&self.models),
            categories::MOVIES_GRHR,
            files::GRHR_TABLE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashingEncoder;
    use crate::test_support::Fixture;
    use curio_abstraction::Recommender;

    #[test]
    fn test_standard_families() {
        let fixture = Fixture::new();
        let factory = FamilyFactory::new(fixture.models.clone(), Arc::new(HashingEncoder::default()));

        let movies = factory.movie_families();
        let books = factory.book_families();
        assert_eq!(movies.len(), 6);
        assert_eq!(books.len(), 5);

        assert!(movies.iter().all(|f| f.degraded() == DegradedPolicy::Unavailable));
        assert!(books.iter().all(|f| matches!(f.degraded(), DegradedPolicy::Fallback(_))));

        let expected = [
            ("movies.knn", categories::MOVIES_KNN, "sparse_knn", MatchPolicy::Exact, SamplingPolicy::Pool { size: 20 }),
            ("movies.tfidf", categories::MOVIES_TFIDF, "sparse_knn", MatchPolicy::Exact, SamplingPolicy::Strict),
            ("movies.knn_genre", categories::MOVIES_KNN_GENRE, "sparse_knn", MatchPolicy::Exact, SamplingPolicy::Pool { size: 25 }),
            ("movies.genre_based", categories::MOVIES_GENRE_BASED, "cosine", MatchPolicy::Exact, SamplingPolicy::Pool { size: 25 }),
            ("movies.embeddings", categories::MOVIES_EMBEDDINGS, "embedding", MatchPolicy::CaseInsensitive, SamplingPolicy::Strict),
            ("movies.nn", categories::MOVIES_NN, "cosine", MatchPolicy::CaseInsensitive, SamplingPolicy::Strict),
            ("books.knn", categories::BOOKS_KNN, "sparse_knn", MatchPolicy::ExactThenContains, SamplingPolicy::Pool { size: 20 }),
            ("books.genre_based", categories::BOOKS_GENRE_KNN, "cosine", MatchPolicy::ExactThenContains, SamplingPolicy::Pool { size: 50 }),
            ("books.knn_genre", categories::BOOKS_GENRE_KNN, "cosine", MatchPolicy::ExactThenContains, SamplingPolicy::Pool { size: 25 }),
            ("books.embeddings", categories::BOOKS_EMBEDDINGS, "embedding", MatchPolicy::CaseInsensitive, SamplingPolicy::ScaledPool { factor: 5 }),
            ("books.nn", categories::BOOKS_NN, "cosine", MatchPolicy::CaseInsensitive, SamplingPolicy::Strict),
        ];
        let all: Vec<&FamilyRecommender> = movies.iter().chain(books.iter()).collect();
        for (id, category, ranker, matching, sampling) in expected {
            let family = all.iter().find(|f| f.family().to_string() == id).unwrap();
            assert_eq!(family.category(), category, "{id}");
            assert_eq!(family.ranker_name(), ranker, "{id}");
            assert_eq!(family.matching(), matching, "{id}");
            assert_eq!(family.sampling(), sampling, "{id}");
        }

        let books_genre = books.iter().find(|f| f.family().name == "genre_based").unwrap();
        assert_eq!(books_genre.degraded(), DegradedPolicy::Fallback(GENERIC_BOOKS));
        let books_nn = books.iter().find(|f| f.family().name == "nn").unwrap();
        assert_eq!(books_nn.degraded(), DegradedPolicy::Fallback(EXTENDED_BOOKS));

        let grhr = factory.genre_filter();
        assert_eq!(grhr.family().to_string(), "movies.grhr");
    }
}
