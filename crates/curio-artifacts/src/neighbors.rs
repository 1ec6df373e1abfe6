//! Fitted nearest-neighbour index.

use crate::matrix::{FeatureMatrix, RowView};
use curio_abstraction::RankError;
use serde::{Deserialize, Serialize};

/// Distance metric of a neighbour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Manhattan,
}

impl Metric {
    fn distance(self, a: &RowView<'_>, b: &RowView<'_>) -> f32 {
        match self {
            Self::Cosine => 1.0 - a.cosine(b),
            Self::Euclidean => {
                let sq = b.dot(b) - 2.0 * a.dot(b) + a.dot(a);
                sq.max(0.0).sqrt()
            }
            Self::Manhattan => {
                let (a, b) = (a.to_dense(), b.to_dense());
                a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
            }
        }
    }
}

/// A neighbour returned by [`NeighborIndex::kneighbors`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

/// Brute-force nearest-neighbour index over its fitted rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborIndex {
    #[serde(default)]
    pub metric: Metric,
    pub fitted: FeatureMatrix,
}

impl NeighborIndex {
    #[must_use]
    pub fn new(metric: Metric, fitted: FeatureMatrix) -> Self {
        Self { metric, fitted }
    }

    /// Number of fitted rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fitted.rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fitted.rows() == 0
    }

    /// The `k` fitted rows closest to `query`, nearest first.
    ///
    /// Ties are broken by row position so results are deterministic.
    pub fn kneighbors(&self, query: &RowView<'_>, k: usize) -> Result<Vec<Neighbor>, RankError> {
        if query.dim() != self.fitted.cols() {
            return Err(RankError::DimensionMismatch {
                expected: self.fitted.cols(),
                got: query.dim(),
            });
        }
        if !query.is_finite() {
            return Err(RankError::MalformedFeatures(
                "query vector contains non-finite values".to_string(),
            ));
        }

        let mut neighbors: Vec<Neighbor> = (0..self.fitted.rows())
            .filter_map(|index| {
                self.fitted
                    .row(index)
                    .map(|row| Neighbor { index, distance: self.metric.distance(query, &row) })
            })
            .collect();
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        neighbors.truncate(k);
        Ok(neighbors)
    }
}
