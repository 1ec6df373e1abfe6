//! Curio artifact store
//!
//! Read-only, offline-produced model artifacts and the layout they live in:
//! - Artifact kinds (`NeighborIndex`, matrices, title and item tables)
//! - Category declarations (`ArtifactRegistry`) and their on-disk layout
//! - Reading artifacts, plus a writer for export and fixtures

pub mod artifact;
pub mod error;
pub mod items;
pub mod layout;
pub mod matrix;
pub mod neighbors;
pub mod registry;
pub mod titles;

pub use artifact::{read_artifact, write_artifact, Artifact, ArtifactKind, TitleTable};
pub use error::{ArtifactError, ArtifactResult};
pub use items::{ItemRecord, ItemTable};
pub use layout::ArtifactLayout;
pub use matrix::{DenseMatrix, FeatureMatrix, RowView, SparseMatrix};
pub use neighbors::{Metric, Neighbor, NeighborIndex};
pub use registry::{categories, files, ArtifactRegistry, CategorySpec, FileSpec};
pub use titles::{fold_title, TitleIndex};
