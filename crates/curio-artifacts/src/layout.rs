use crate::error::{ArtifactError, ArtifactResult};
use crate::registry::CategorySpec;
use std::path::{Path, PathBuf};

/// Filesystem layout of an artifact store.
///
/// Category directories live directly under the root (`<root>/movies/KNN/...`);
/// configuration lives under `<root>/.curio/config.toml`.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(".curio").join("config.toml")
    }

    #[must_use]
    pub fn category_dir(&self, category: &CategorySpec) -> PathBuf {
        self.root.join(&category.dir)
    }

    /// Path of a file inside a category directory.
    ///
    /// File names must be plain names; separators and parent references are
    /// rejected so a lookup can never leave the category directory.
    pub fn file_path(&self, category: &CategorySpec, file: &str) -> ArtifactResult<PathBuf> {
        let plain = !file.is_empty()
            && !file.contains(['/', '\\'])
            && file != "."
            && file != "..";
        if !plain {
            return Err(ArtifactError::InvalidFileName(file.to_string()));
        }
        Ok(self.category_dir(category).join(file))
    }

    pub fn ensure_category_dir(&self, category: &CategorySpec) -> ArtifactResult<()> {
        std::fs::create_dir_all(self.category_dir(category))?;
        Ok(())
    }
}
