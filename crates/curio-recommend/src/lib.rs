//! Recommender families for Curio.
//!
//! Every family resolves query titles against its title table, ranks
//! candidates with one of the rankers and samples the final list.
//!
//! # Families
//!
//! - **Sparse KNN**: nearest neighbors in a fitted index (`knn`, `tfidf`, `knn_genre`)
//! - **Cosine**: similarity over a feature matrix or item features (`genre_based`, `nn`)
//! - **Embeddings**: encoded item text against precomputed embeddings
//! - **Genre filter**: top-rated items carrying every requested genre (`grhr`)

pub mod catalog;
pub mod config;
pub mod encoder;
pub mod families;
pub mod family;
pub mod genre_filter;
pub mod rankers;
pub mod resolver;
pub mod sampling;
pub mod service;

#[cfg(test)]
mod test_support;

pub use catalog::{DegradedPolicy, EXTENDED_BOOKS, GENERIC_BOOKS};
pub use config::{load_recommend_config, FamilyOverride, RecommendConfig};
#[cfg(feature = "fastembed")]
pub use encoder::FastEmbedEncoder;
pub use encoder::{default_encoder, EncodeError, HashingEncoder, TextEncoder, DEFAULT_DIMENSION};
pub use families::FamilyFactory;
pub use family::FamilyRecommender;
pub use genre_filter::{GenreFilterRecommender, TOP_RATED_POOL};
pub use rankers::{
    CosineFeatures, CosineRanker, EmbeddingRanker, KnnQuery, RankSession, Ranker, SparseKnnRanker,
};
pub use resolver::{resolve, MatchPolicy};
pub use sampling::{sample_titles, SamplingPolicy};
pub use service::{RecommendationService, ServiceError};
