//! Cosine-similarity ranking against every item.

use super::{fetch, shape_error, sort_by_score, RankSession, Ranker};
use curio_abstraction::RankError;
use curio_artifacts::{Artifact, RowView, TitleIndex};
use curio_models::ModelCache;
use rand::RngCore;
use std::sync::Arc;
use tracing::error;

/// Feature rows compared by a [`CosineRanker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosineFeatures {
    /// Rows of a sparse matrix artifact aligned with the title table.
    Matrix {
        /// Matrix file inside the category.
        file: String,
    },
    /// The `features` column of an item table.
    ItemFeatures,
}

/// Scores every item by cosine similarity to the query row.
///
/// The query's own score is forced to -1 and the scores are sorted
/// descending, ties by position.
#[derive(Debug, Clone)]
pub struct CosineRanker {
    category: String,
    titles_file: String,
    features: CosineFeatures,
}

impl CosineRanker {
    pub fn new(
        category: impl Into<String>,
        titles_file: impl Into<String>,
        features: CosineFeatures,
    ) -> Self {
        Self { category: category.into(), titles_file: titles_file.into(), features }
    }
}

struct CosineSession {
    titles: Arc<Artifact>,
    matrix: Option<Arc<Artifact>>,
}

impl Ranker for CosineRanker {
    fn name(&self) -> &'static str {
        "cosine"
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn load(&self, models: &ModelCache) -> Option<Box<dyn RankSession>> {
        let titles = fetch(models, &self.category, &self.titles_file, Artifact::as_titles)?;
        let matrix = match &self.features {
            CosineFeatures::Matrix { file } => {
                Some(fetch(models, &self.category, file, Artifact::as_sparse_matrix)?)
            }
            CosineFeatures::ItemFeatures => {
                if let Err(e) = titles.as_item_table() {
                    error!(category = %self.category, file = %self.titles_file, error = %e, "Feature ranking needs an item table");
                    return None;
                }
                None
            }
        };
        Some(Box::new(CosineSession { titles, matrix }))
    }
}

impl CosineSession {
    fn matrix_scores(matrix: &Artifact, query: usize) -> Result<Vec<(usize, f32)>, RankError> {
        let matrix = matrix.as_sparse_matrix().map_err(shape_error)?;
        let row = matrix
            .row(query)
            .ok_or(RankError::IndexOutOfRange { index: query, len: matrix.rows() })?;
        if !row.is_finite() {
            return Err(RankError::MalformedFeatures(format!(
                "row {query} contains non-finite values"
            )));
        }
        Ok((0..matrix.rows())
            .filter_map(|i| matrix.row(i).map(|other| (i, row.cosine(&other))))
            .collect())
    }

    fn feature_scores(&self, query: usize) -> Result<Vec<(usize, f32)>, RankError> {
        let table = self.titles.as_item_table().map_err(shape_error)?;
        let item = table
            .item(query)
            .ok_or(RankError::IndexOutOfRange { index: query, len: table.len() })?;
        let expected = item.features.len();
        if expected == 0 {
            return Err(RankError::MalformedFeatures(format!("'{}' has no features", item.title)));
        }
        let row = RowView::Dense(&item.features);
        if !row.is_finite() {
            return Err(RankError::MalformedFeatures(format!(
                "'{}' has non-finite features",
                item.title
            )));
        }

        table
            .items()
            .iter()
            .enumerate()
            .map(|(i, other)| {
                if other.features.len() != expected {
                    return Err(RankError::DimensionMismatch {
                        expected,
                        got: other.features.len(),
                    });
                }
                Ok((i, row.cosine(&RowView::Dense(&other.features))))
            })
            .collect()
    }
}

impl RankSession for CosineSession {
    fn titles(&self) -> Result<&TitleIndex, RankError> {
        self.titles.as_titles().map_err(shape_error)
    }

    fn rank(
        &self,
        query: usize,
        width: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, RankError> {
        let mut scored = match &self.matrix {
            Some(matrix) => Self::matrix_scores(matrix, query)?,
            None => self.feature_scores(query)?,
        };
        for entry in &mut scored {
            if entry.0 == query {
                entry.1 = -1.0;
            }
        }
        sort_by_score(&mut scored);

        Ok(scored
            .into_iter()
            .map(|(i, _)| i)
            .filter(|&i| i != query)
            .take(width)
            .collect())
    }
}
