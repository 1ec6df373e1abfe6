use crate::artifact::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("unknown model category: {0}")]
    UnknownCategory(String),

    #[error("artifact file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid artifact file name: {0}")]
    InvalidFileName(String),

    #[error("expected {expected} artifact, found {found}")]
    KindMismatch { expected: ArtifactKind, found: ArtifactKind },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
