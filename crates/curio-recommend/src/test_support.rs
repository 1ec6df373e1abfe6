//! Artifact-root fixtures shared by unit tests.

use curio_artifacts::{write_artifact, Artifact, ArtifactLayout, ArtifactRegistry};
use curio_models::{CacheConfig, FixedMemoryProbe, ModelCache};
use std::sync::Arc;
use tempfile::TempDir;

pub(crate) struct Fixture {
    _temp: TempDir,
    pub(crate) layout: ArtifactLayout,
    pub(crate) models: Arc<ModelCache>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let layout = ArtifactLayout::new(temp.path());
        let models = ModelCache::with_probe(
            layout.clone(),
            ArtifactRegistry::standard(),
            CacheConfig::default(),
            Arc::new(FixedMemoryProbe::new(20.0)),
        )
        .unwrap();
        Self { _temp: temp, layout, models: Arc::new(models) }
    }

    pub(crate) fn write(&self, category: &str, file: &str, artifact: impl Into<Artifact>) {
        let registry = self.models.registry();
        let spec = registry.category(category).unwrap();
        let path = self.layout.file_path(spec, file).unwrap();
        write_artifact(&path, &artifact.into()).unwrap();
    }
}

pub(crate) fn titles(names: &[&str]) -> curio_artifacts::TitleIndex {
    names.iter().map(|name| (*name).to_string()).collect()
}
