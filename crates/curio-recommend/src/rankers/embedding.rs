//! Embedding ranking: encode the query item's text and compare it with the
//! precomputed item embeddings.

use super::{fetch, shape_error, sort_by_score, RankSession, Ranker};
use crate::encoder::TextEncoder;
use crate::resolver::same_title;
use curio_abstraction::RankError;
use curio_artifacts::{Artifact, RowView, TitleIndex};
use curio_models::ModelCache;
use rand::{Rng, RngCore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EmbeddingRanker {
    category: String,
    table_file: String,
    embeddings_file: String,
    encoder: Arc<dyn TextEncoder>,
    jitter: f32,
}

impl EmbeddingRanker {
    pub fn new(
        category: impl Into<String>,
        table_file: impl Into<String>,
        embeddings_file: impl Into<String>,
        encoder: Arc<dyn TextEncoder>,
    ) -> Self {
        Self {
            category: category.into(),
            table_file: table_file.into(),
            embeddings_file: embeddings_file.into(),
            encoder,
            jitter: 0.0,
        }
    }

    /// Add uniform noise in `[-jitter, jitter]` to every score.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.abs();
        self
    }
}

struct EmbeddingSession {
    table: Arc<Artifact>,
    embeddings: Arc<Artifact>,
    encoder: Arc<dyn TextEncoder>,
    jitter: f32,
}

impl Ranker for EmbeddingRanker {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn load(&self, models: &ModelCache) -> Option<Box<dyn RankSession>> {
        let table = fetch(models, &self.category, &self.table_file, Artifact::as_item_table)?;
        let embeddings =
            fetch(models, &self.category, &self.embeddings_file, Artifact::as_dense_matrix)?;
        Some(Box::new(EmbeddingSession {
            table,
            embeddings,
            encoder: Arc::clone(&self.encoder),
            jitter: self.jitter,
        }))
    }
}

impl RankSession for EmbeddingSession {
    fn titles(&self) -> Result<&TitleIndex, RankError> {
        self.table.as_titles().map_err(shape_error)
    }

    fn rank(
        &self,
        query: usize,
        width: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, RankError> {
        let table = self.table.as_item_table().map_err(shape_error)?;
        let embeddings = self.embeddings.as_dense_matrix().map_err(shape_error)?;
        if embeddings.rows() != table.len() {
            return Err(RankError::MalformedFeatures(format!(
                "{} embeddings for {} items",
                embeddings.rows(),
                table.len()
            )));
        }
        if self.encoder.dimension() != embeddings.cols() {
            return Err(RankError::DimensionMismatch {
                expected: embeddings.cols(),
                got: self.encoder.dimension(),
            });
        }

        let item = table
            .item(query)
            .ok_or(RankError::IndexOutOfRange { index: query, len: table.len() })?;
        let encoded = self
            .encoder
            .encode(item.embedding_text())
            .map_err(|e| RankError::Encoder(e.to_string()))?;
        if encoded.len() != embeddings.cols() {
            return Err(RankError::DimensionMismatch {
                expected: embeddings.cols(),
                got: encoded.len(),
            });
        }
        let query_row = RowView::Dense(&encoded);

        let mut scored: Vec<(usize, f32)> = (0..embeddings.rows())
            .filter_map(|i| embeddings.row(i).map(|row| (i, query_row.cosine(&row))))
            .collect();
        if self.jitter > 0.0 {
            for entry in &mut scored {
                entry.1 += rng.gen_range(-self.jitter..=self.jitter);
            }
        }
        sort_by_score(&mut scored);

        // top width + 1, minus anything sharing the query's title
        let search_k = width.saturating_add(1);
        Ok(scored
            .into_iter()
            .take(search_k)
            .map(|(i, _)| i)
            .filter(|&i| {
                i != query && table.item(i).is_some_and(|other| !same_title(&other.title, &item.title))
            })
            .take(width)
            .collect())
    }
}
