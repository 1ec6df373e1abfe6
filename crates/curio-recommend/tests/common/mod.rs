//! Shared artifact-root fixture for integration tests.

#![allow(dead_code)]

use curio_artifacts::{
    categories, files, write_artifact, Artifact, ArtifactLayout, ArtifactRegistry, FeatureMatrix,
    Metric, NeighborIndex, SparseMatrix, TitleIndex,
};
use curio_models::{CacheConfig, FixedMemoryProbe, ModelCache};
use curio_recommend::{RecommendConfig, RecommendationService};
use std::sync::Arc;
use tempfile::TempDir;

pub struct ArtifactRoot {
    pub temp: TempDir,
    pub layout: ArtifactLayout,
    pub registry: ArtifactRegistry,
}

impl ArtifactRoot {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let layout = ArtifactLayout::new(temp.path());
        Self { temp, layout, registry: ArtifactRegistry::standard() }
    }

    pub fn write(&self, category: &str, file: &str, artifact: impl Into<Artifact>) {
        let spec = self.registry.category(category).unwrap();
        let path = self.layout.file_path(spec, file).unwrap();
        write_artifact(&path, &artifact.into()).unwrap();
    }

    pub fn write_config(&self, contents: &str) {
        let path = self.layout.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn cache(&self, config: CacheConfig, probe: Arc<FixedMemoryProbe>) -> Arc<ModelCache> {
        Arc::new(
            ModelCache::with_probe(self.layout.clone(), self.registry.clone(), config, probe)
                .unwrap(),
        )
    }

    pub fn service(&self, memory_percent: f64) -> RecommendationService {
        let probe = Arc::new(FixedMemoryProbe::new(memory_percent));
        RecommendationService::new(
            self.cache(CacheConfig::default(), probe),
            RecommendConfig::default(),
        )
    }

    /// Writes a books KNN category of `count` titles on a circle, "1984" first.
    pub fn write_books_knn(&self, count: usize) -> Vec<Vec<f32>> {
        let rows: Vec<Vec<f32>> = (0..count)
            .map(|i| {
                let angle = i as f32 * 0.05;
                vec![angle.cos(), angle.sin(), 0.1]
            })
            .collect();
        let matrix = SparseMatrix::from_dense_rows(&rows).unwrap();
        self.write(
            categories::BOOKS_KNN,
            files::KNN_MODEL,
            NeighborIndex::new(Metric::Cosine, FeatureMatrix::Sparse(matrix.clone())),
        );
        self.write(categories::BOOKS_KNN, files::SPARSE_MATRIX, matrix);
        self.write(categories::BOOKS_KNN, files::BOOK_MAPPING, book_titles(count));
        rows
    }
}

pub fn book_titles(count: usize) -> TitleIndex {
    std::iter::once("1984".to_string())
        .chain((1..count).map(|i| format!("Book {i}")))
        .collect()
}
