//! Nearest-neighbour ranking over a fitted neighbour index.

use super::{fetch, shape_error, RankSession, Ranker};
use curio_abstraction::RankError;
use curio_artifacts::{Artifact, RowView, TitleIndex};
use curio_models::ModelCache;
use rand::RngCore;
use std::sync::Arc;
use tracing::error;

/// Where the query row for a title comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnnQuery {
    /// Row of a sparse matrix artifact aligned with the title table.
    Matrix {
        /// Matrix file inside the category.
        file: String,
    },
    /// Genre flags of the title's row in an item table.
    ItemGenres,
}

/// Queries a neighbour index for `width + 1` rows and drops the query row.
#[derive(Debug, Clone)]
pub struct SparseKnnRanker {
    category: String,
    index_file: String,
    titles_file: String,
    query: KnnQuery,
}

impl SparseKnnRanker {
    pub fn new(
        category: impl Into<String>,
        index_file: impl Into<String>,
        titles_file: impl Into<String>,
        query: KnnQuery,
    ) -> Self {
        Self {
            category: category.into(),
            index_file: index_file.into(),
            titles_file: titles_file.into(),
            query,
        }
    }
}

struct KnnSession {
    index: Arc<Artifact>,
    titles: Arc<Artifact>,
    matrix: Option<Arc<Artifact>>,
}

impl Ranker for SparseKnnRanker {
    fn name(&self) -> &'static str {
        "sparse_knn"
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn load(&self, models: &ModelCache) -> Option<Box<dyn RankSession>> {
        let index = fetch(models, &self.category, &self.index_file, Artifact::as_neighbor_index)?;
        let titles = fetch(models, &self.category, &self.titles_file, Artifact::as_titles)?;
        let matrix = match &self.query {
            KnnQuery::Matrix { file } => {
                Some(fetch(models, &self.category, file, Artifact::as_sparse_matrix)?)
            }
            KnnQuery::ItemGenres => {
                if let Err(e) = titles.as_item_table() {
                    error!(
                        category = %self.category,
                        file = %self.titles_file,
                        error = %e,
                        "Genre query needs an item table"
                    );
                    return None;
                }
                None
            }
        };
        Some(Box::new(KnnSession { index, titles, matrix }))
    }
}

impl RankSession for KnnSession {
    fn titles(&self) -> Result<&TitleIndex, RankError> {
        self.titles.as_titles().map_err(shape_error)
    }

    fn rank(
        &self,
        query: usize,
        width: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, RankError> {
        let index = self.index.as_neighbor_index().map_err(shape_error)?;
        let k = width.saturating_add(1);

        let neighbors = match &self.matrix {
            Some(matrix) => {
                let matrix = matrix.as_sparse_matrix().map_err(shape_error)?;
                let row = matrix
                    .row(query)
                    .ok_or(RankError::IndexOutOfRange { index: query, len: matrix.rows() })?;
                index.kneighbors(&row, k)?
            }
            None => {
                let table = self.titles.as_item_table().map_err(shape_error)?;
                let genres = table
                    .genre_vector(query)
                    .ok_or(RankError::IndexOutOfRange { index: query, len: table.len() })?;
                index.kneighbors(&RowView::Dense(&genres), k)?
            }
        };

        Ok(neighbors
            .into_iter()
            .map(|neighbor| neighbor.index)
            .filter(|&candidate| candidate != query)
            .take(width)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{titles, Fixture};
    use curio_artifacts::{
        categories, files, FeatureMatrix, ItemRecord, ItemTable, Metric, NeighborIndex,
        SparseMatrix,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn movie_knn(fixture: &Fixture) -> SparseKnnRanker {
        let rows = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.8, 0.0, 0.2],
            vec![0.0, 0.0, 1.0],
        ];
        let matrix = SparseMatrix::from_dense_rows(&rows).unwrap();
        fixture.write(
            categories::MOVIES_KNN,
            files::KNN_MODEL,
            NeighborIndex::new(Metric::Cosine, FeatureMatrix::Sparse(matrix.clone())),
        );
        fixture.write(categories::MOVIES_KNN, files::SPARSE_MATRIX, matrix);
        fixture.write(
            categories::MOVIES_KNN,
            files::MOVIE_MAPPING,
            titles(&["Heat", "Ronin", "Amelie", "Thief", "Up"]),
        );
        SparseKnnRanker::new(
            categories::MOVIES_KNN,
            files::KNN_MODEL,
            files::MOVIE_MAPPING,
            KnnQuery::Matrix { file: files::SPARSE_MATRIX.to_string() },
        )
    }

    #[test]
    fn test_rank_excludes_query_and_orders_by_distance() {
        let fixture = Fixture::new();
        let ranker = movie_knn(&fixture);
        let session = ranker.load(&fixture.models).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(session.rank(0, 2, &mut rng).unwrap(), vec![1, 3]);
        let all = session.rank(0, 10, &mut rng).unwrap();
        assert_eq!(all.len(), 4);
        assert!(!all.contains(&0));
    }

    #[test]
    fn test_missing_artifact_fails_load() {
        let fixture = Fixture::new();
        let ranker = SparseKnnRanker::new(
            categories::MOVIES_KNN,
            files::KNN_MODEL,
            files::MOVIE_MAPPING,
            KnnQuery::Matrix { file: files::SPARSE_MATRIX.to_string() },
        );
        assert!(ranker.load(&fixture.models).is_none());
    }

    #[test]
    fn test_query_row_out_of_range() {
        let fixture = Fixture::new();
        let ranker = movie_knn(&fixture);
        let session = ranker.load(&fixture.models).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let err = session.rank(9, 2, &mut rng).unwrap_err();
        assert_eq!(err, RankError::IndexOutOfRange { index: 9, len: 5 });
    }

    #[test]
    fn test_genre_flags_query() {
        let fixture = Fixture::new();
        let genre_columns: Vec<String> =
            ["Action", "Comedy", "Drama"].iter().map(|s| (*s).to_string()).collect();
        let table = ItemTable::new(
            genre_columns,
            Vec::new(),
            vec![
                ItemRecord::new("Heat").with_genres(["Action", "Drama"]),
                ItemRecord::new("Airplane!").with_genres(["Comedy"]),
                ItemRecord::new("Ronin").with_genres(["Action", "Drama"]),
                ItemRecord::new("Speed").with_genres(["Action"]),
            ],
        );
        let fitted = SparseMatrix::from_dense_rows(&[
            vec![1.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ])
        .unwrap();
        fixture.write(
            categories::MOVIES_KNN_GENRE,
            files::GENRE_KNN_MODEL,
            NeighborIndex::new(Metric::Euclidean, FeatureMatrix::Sparse(fitted)),
        );
        fixture.write(categories::MOVIES_KNN_GENRE, files::GENRE_MOVIES, table);

        let ranker = SparseKnnRanker::new(
            categories::MOVIES_KNN_GENRE,
            files::GENRE_KNN_MODEL,
            files::GENRE_MOVIES,
            KnnQuery::ItemGenres,
        );
        let session = ranker.load(&fixture.models).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(session.rank(0, 2, &mut rng).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_genre_query_requires_item_table() {
        let fixture = Fixture::new();
        let fitted = SparseMatrix::from_dense_rows(&[vec![1.0]]).unwrap();
        fixture.write(
            categories::MOVIES_KNN_GENRE,
            files::GENRE_KNN_MODEL,
            NeighborIndex::new(Metric::Cosine, FeatureMatrix::Sparse(fitted)),
        );
        // registered as an item table, so a plain title table is a kind mismatch
        fixture.write(categories::MOVIES_KNN_GENRE, files::GENRE_MOVIES, titles(&["Heat"]));

        let ranker = SparseKnnRanker::new(
            categories::MOVIES_KNN_GENRE,
            files::GENRE_KNN_MODEL,
            files::GENRE_MOVIES,
            KnnQuery::ItemGenres,
        );
        assert!(ranker.load(&fixture.models).is_none());
    }
}
