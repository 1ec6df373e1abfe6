//! Sparse and dense feature matrices.

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};

/// Compressed sparse row matrix.
///
/// Column indices inside a row are strictly increasing; this is checked when
/// the matrix is built or deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSparseMatrix", into = "RawSparseMatrix")]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSparseMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

impl TryFrom<RawSparseMatrix> for SparseMatrix {
    type Error = ArtifactError;

    fn try_from(raw: RawSparseMatrix) -> Result<Self, Self::Error> {
        if raw.rows.checked_add(1) != Some(raw.indptr.len()) {
            return Err(ArtifactError::InvalidArtifact(format!(
                "sparse matrix indptr has {} entries for {} rows",
                raw.indptr.len(),
                raw.rows
            )));
        }
        if raw.indices.len() != raw.data.len() {
            return Err(ArtifactError::InvalidArtifact(
                "sparse matrix indices and data differ in length".to_string(),
            ));
        }
        if raw.indptr.first() != Some(&0) || raw.indptr.last() != Some(&raw.data.len()) {
            return Err(ArtifactError::InvalidArtifact(
                "sparse matrix indptr does not span the data".to_string(),
            ));
        }
        for (row, bounds) in raw.indptr.windows(2).enumerate() {
            if bounds[0] > bounds[1] {
                return Err(ArtifactError::InvalidArtifact(format!(
                    "sparse matrix indptr decreases at row {row}"
                )));
            }
        }
        for (row, bounds) in raw.indptr.windows(2).enumerate() {
            let cols = &raw.indices[bounds[0]..bounds[1]];
            if cols.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ArtifactError::InvalidArtifact(format!(
                    "sparse matrix row {row} has unsorted column indices"
                )));
            }
            if cols.last().is_some_and(|&c| c >= raw.cols) {
                return Err(ArtifactError::InvalidArtifact(format!(
                    "sparse matrix row {row} references a column past {}",
                    raw.cols
                )));
            }
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            indptr: raw.indptr,
            indices: raw.indices,
            data: raw.data,
        })
    }
}

impl From<SparseMatrix> for RawSparseMatrix {
    fn from(m: SparseMatrix) -> Self {
        Self { rows: m.rows, cols: m.cols, indptr: m.indptr, indices: m.indices, data: m.data }
    }
}

impl SparseMatrix {
    /// Build a sparse matrix from dense rows, dropping zeros.
    pub fn from_dense_rows(rows: &[Vec<f32>]) -> Result<Self, ArtifactError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ArtifactError::InvalidArtifact(format!(
                    "row {r} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            for (c, &value) in row.iter().enumerate() {
                if value != 0.0 {
                    indices.push(c);
                    data.push(value);
                }
            }
            indptr.push(data.len());
        }
        Ok(Self { rows: rows.len(), cols, indptr, indices, data })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored (non-zero) values.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// View of a single row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        if row >= self.rows {
            return None;
        }
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        Some(RowView::Sparse {
            dim: self.cols,
            indices: &self.indices[start..end],
            values: &self.data[start..end],
        })
    }
}

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDenseMatrix", into = "RawDenseMatrix")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TryFrom<RawDenseMatrix> for DenseMatrix {
    type Error = ArtifactError;

    fn try_from(raw: RawDenseMatrix) -> Result<Self, Self::Error> {
        let Some(len) = raw.rows.checked_mul(raw.cols) else {
            return Err(ArtifactError::InvalidArtifact(format!(
                "dense matrix shape {}x{} overflows",
                raw.rows, raw.cols
            )));
        };
        if raw.data.len() != len {
            return Err(ArtifactError::InvalidArtifact(format!(
                "dense matrix holds {} values for {}x{}",
                raw.data.len(),
                raw.rows,
                raw.cols
            )));
        }
        Ok(Self { rows: raw.rows, cols: raw.cols, data: raw.data })
    }
}

impl From<DenseMatrix> for RawDenseMatrix {
    fn from(m: DenseMatrix) -> Self {
        Self { rows: m.rows, cols: m.cols, data: m.data }
    }
}

impl DenseMatrix {
    /// Build a dense matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, ArtifactError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ArtifactError::InvalidArtifact(format!(
                    "row {r} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        self.row_slice(row).map(RowView::Dense)
    }

    #[must_use]
    pub fn row_slice(&self, row: usize) -> Option<&[f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }
}

/// Either matrix layout, as stored inside a neighbour index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum FeatureMatrix {
    Sparse(SparseMatrix),
    Dense(DenseMatrix),
}

impl FeatureMatrix {
    #[must_use]
    pub fn rows(&self) -> usize {
        match self {
            Self::Sparse(m) => m.rows(),
            Self::Dense(m) => m.rows(),
        }
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        match self {
            Self::Sparse(m) => m.cols(),
            Self::Dense(m) => m.cols(),
        }
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        match self {
            Self::Sparse(m) => m.row(row),
            Self::Dense(m) => m.row(row),
        }
    }
}

/// Borrowed view of one feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowView<'a> {
    Sparse { dim: usize, indices: &'a [usize], values: &'a [f32] },
    Dense(&'a [f32]),
}

impl RowView<'_> {
    /// Number of columns of the row.
    #[must_use]
    pub fn dim(&self) -> usize {
        match self {
            Self::Sparse { dim, .. } => *dim,
            Self::Dense(values) => values.len(),
        }
    }

    /// Dot product. Both rows must have the same dimension.
    #[must_use]
    pub fn dot(&self, other: &RowView<'_>) -> f32 {
        match (self, other) {
            (RowView::Dense(a), RowView::Dense(b)) => {
                a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
            }
            (RowView::Sparse { indices, values, .. }, RowView::Dense(dense))
            | (RowView::Dense(dense), RowView::Sparse { indices, values, .. }) => indices
                .iter()
                .zip(values.iter())
                .map(|(&i, v)| v * dense.get(i).copied().unwrap_or(0.0))
                .sum(),
            (
                RowView::Sparse { indices: ai, values: av, .. },
                RowView::Sparse { indices: bi, values: bv, .. },
            ) => {
                let (mut i, mut j, mut sum) = (0, 0, 0.0);
                while i < ai.len() && j < bi.len() {
                    match ai[i].cmp(&bi[j]) {
                        std::cmp::Ordering::Less => i += 1,
                        std::cmp::Ordering::Greater => j += 1,
                        std::cmp::Ordering::Equal => {
                            sum += av[i] * bv[j];
                            i += 1;
                            j += 1;
                        }
                    }
                }
                sum
            }
        }
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f32 {
        let values = match self {
            Self::Sparse { values, .. } => *values,
            Self::Dense(values) => *values,
        };
        values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Cosine similarity; zero when either row is all zeros.
    #[must_use]
    pub fn cosine(&self, other: &RowView<'_>) -> f32 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 { 0.0 } else { self.dot(other) / denom }
    }

    /// Whether every stored value is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Sparse { values, .. } | Self::Dense(values) => values.iter().all(|v| v.is_finite()),
        }
    }

    /// Expand into a dense vector.
    #[must_use]
    pub fn to_dense(&self) -> Vec<f32> {
        match self {
            Self::Dense(values) => values.to_vec(),
            Self::Sparse { dim, indices, values } => {
                let mut out = vec![0.0; *dim];
                for (&i, &v) in indices.iter().zip(values.iter()) {
                    out[i] = v;
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_from_dense_drops_zeros() {
        let m = SparseMatrix::from_dense_rows(&[vec![1.0, 0.0, 2.0], vec![0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.row(1).unwrap().norm(), 0.0);
        assert!(m.row(2).is_none());
    }

    #[test]
    fn test_sparse_and_dense_dot_agree() {
        let rows = vec![vec![1.0, 0.0, 2.0], vec![0.0, 3.0, 4.0]];
        let sparse = SparseMatrix::from_dense_rows(&rows).unwrap();
        let dense = DenseMatrix::from_rows(&rows).unwrap();

        let ss = sparse.row(0).unwrap().dot(&sparse.row(1).unwrap());
        let dd = dense.row(0).unwrap().dot(&dense.row(1).unwrap());
        let sd = sparse.row(0).unwrap().dot(&dense.row(1).unwrap());
        assert_eq!(ss, 8.0);
        assert_eq!(dd, 8.0);
        assert_eq!(sd, 8.0);
    }

    #[test]
    fn test_cosine_of_zero_row_is_zero() {
        let dense = DenseMatrix::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(dense.row(0).unwrap().cosine(&dense.row(1).unwrap()), 0.0);
    }

    #[test]
    fn test_sparse_deserialize_rejects_bad_indptr() {
        let json = r#"{"rows":2,"cols":2,"indptr":[0,1],"indices":[0],"data":[1.0]}"#;
        assert!(serde_json::from_str::<SparseMatrix>(json).is_err());
    }

    #[test]
    fn test_sparse_deserialize_rejects_unsorted_columns() {
        let json = r#"{"rows":1,"cols":3,"indptr":[0,2],"indices":[2,0],"data":[1.0,1.0]}"#;
        assert!(serde_json::from_str::<SparseMatrix>(json).is_err());
    }

    #[test]
    fn test_sparse_deserialize_rejects_indptr_past_data() {
        let json = r#"{"rows":2,"cols":2,"indptr":[0,100,2],"indices":[0,1],"data":[1.0,1.0]}"#;
        assert!(serde_json::from_str::<SparseMatrix>(json).is_err());
    }

    #[test]
    fn test_dense_deserialize_rejects_overflowing_shape() {
        let json = r#"{"rows":9223372036854775808,"cols":2,"data":[]}"#;
        assert!(serde_json::from_str::<DenseMatrix>(json).is_err());
    }

    #[test]
    fn test_dot_across_matrices() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let product = {
            let b = SparseMatrix::from_dense_rows(&[vec![3.0, 0.0]]).unwrap();
            let row = b.row(0).unwrap();
            a.row(0).unwrap().dot(&row)
        };
        assert_eq!(product, 3.0);
    }

    #[test]
    fn test_dense_deserialize_rejects_wrong_size() {
        let json = r#"{"rows":2,"cols":2,"data":[1.0,2.0,3.0]}"#;
        assert!(serde_json::from_str::<DenseMatrix>(json).is_err());
    }

    #[test]
    fn test_to_dense_expands_sparse_row() {
        let m = SparseMatrix::from_dense_rows(&[vec![0.0, 5.0, 0.0]]).unwrap();
        assert_eq!(m.row(0).unwrap().to_dense(), vec![0.0, 5.0, 0.0]);
    }
}
