use crate::error::{ArtifactError, ArtifactResult};
use crate::items::ItemTable;
use crate::matrix::{DenseMatrix, SparseMatrix};
use crate::neighbors::NeighborIndex;
use crate::titles::TitleIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    NeighborIndex,
    SparseMatrix,
    DenseMatrix,
    TitleTable,
    ItemTable,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NeighborIndex => "neighbor_index",
            Self::SparseMatrix => "sparse_matrix",
            Self::DenseMatrix => "dense_matrix",
            Self::TitleTable => "title_table",
            Self::ItemTable => "item_table",
        };
        f.write_str(name)
    }
}

/// Position -> title table, stored as a plain list of titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleTable {
    pub titles: TitleIndex,
}

/// An offline-produced, read-only object loaded from the artifact store.
///
/// On disk every artifact is a JSON document tagged with its `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    NeighborIndex(NeighborIndex),
    SparseMatrix(SparseMatrix),
    DenseMatrix(DenseMatrix),
    TitleTable(TitleTable),
    ItemTable(ItemTable),
}

impl Artifact {
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::NeighborIndex(_) => ArtifactKind::NeighborIndex,
            Self::SparseMatrix(_) => ArtifactKind::SparseMatrix,
            Self::DenseMatrix(_) => ArtifactKind::DenseMatrix,
            Self::TitleTable(_) => ArtifactKind::TitleTable,
            Self::ItemTable(_) => ArtifactKind::ItemTable,
        }
    }

    pub fn as_neighbor_index(&self) -> ArtifactResult<&NeighborIndex> {
        match self {
            Self::NeighborIndex(index) => Ok(index),
            other => Err(other.mismatch(ArtifactKind::NeighborIndex)),
        }
    }

    pub fn as_sparse_matrix(&self) -> ArtifactResult<&SparseMatrix> {
        match self {
            Self::SparseMatrix(matrix) => Ok(matrix),
            other => Err(other.mismatch(ArtifactKind::SparseMatrix)),
        }
    }

    pub fn as_dense_matrix(&self) -> ArtifactResult<&DenseMatrix> {
        match self {
            Self::DenseMatrix(matrix) => Ok(matrix),
            other => Err(other.mismatch(ArtifactKind::DenseMatrix)),
        }
    }

    /// Title index of a title table or of an item table.
    pub fn as_titles(&self) -> ArtifactResult<&TitleIndex> {
        match self {
            Self::TitleTable(table) => Ok(&table.titles),
            Self::ItemTable(table) => Ok(table.titles()),
            other => Err(other.mismatch(ArtifactKind::TitleTable)),
        }
    }

    pub fn as_item_table(&self) -> ArtifactResult<&ItemTable> {
        match self {
            Self::ItemTable(table) => Ok(table),
            other => Err(other.mismatch(ArtifactKind::ItemTable)),
        }
    }

    fn mismatch(&self, expected: ArtifactKind) -> ArtifactError {
        ArtifactError::KindMismatch { expected, found: self.kind() }
    }
}

impl From<NeighborIndex> for Artifact {
    fn from(index: NeighborIndex) -> Self {
        Self::NeighborIndex(index)
    }
}

impl From<SparseMatrix> for Artifact {
    fn from(matrix: SparseMatrix) -> Self {
        Self::SparseMatrix(matrix)
    }
}

impl From<DenseMatrix> for Artifact {
    fn from(matrix: DenseMatrix) -> Self {
        Self::DenseMatrix(matrix)
    }
}

impl From<TitleIndex> for Artifact {
    fn from(titles: TitleIndex) -> Self {
        Self::TitleTable(TitleTable { titles })
    }
}

impl From<ItemTable> for Artifact {
    fn from(table: ItemTable) -> Self {
        Self::ItemTable(table)
    }
}

/// Read and deserialize an artifact file.
pub fn read_artifact(path: &Path) -> ArtifactResult<Artifact> {
    if !path.exists() {
        return Err(ArtifactError::MissingFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Serialize an artifact to disk, creating parent directories.
///
/// Used by the offline export side and by test fixtures.
pub fn write_artifact(path: &Path, artifact: &Artifact) -> ArtifactResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), artifact)?;
    Ok(())
}
