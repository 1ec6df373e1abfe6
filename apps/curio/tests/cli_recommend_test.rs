//! Integration tests for the `curio` binary.

use assert_cmd::Command;
use curio_artifacts::{
    categories, files, write_artifact, Artifact, ArtifactLayout, ArtifactRegistry, FeatureMatrix,
    ItemRecord, ItemTable, Metric, NeighborIndex, SparseMatrix, TitleIndex,
};
use predicates::prelude::*;
use tempfile::TempDir;

fn write(temp: &TempDir, category: &str, file: &str, artifact: impl Into<Artifact>) {
    let layout = ArtifactLayout::new(temp.path());
    let registry = ArtifactRegistry::standard();
    let spec = registry.category(category).unwrap();
    write_artifact(&layout.file_path(spec, file).unwrap(), &artifact.into()).unwrap();
}

fn books_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    let rows = vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.7, 0.3], vec![0.0, 1.0]];
    let matrix = SparseMatrix::from_dense_rows(&rows).unwrap();
    write(
        &temp,
        categories::BOOKS_KNN,
        files::KNN_MODEL,
        NeighborIndex::new(Metric::Cosine, FeatureMatrix::Sparse(matrix.clone())),
    );
    write(&temp, categories::BOOKS_KNN, files::SPARSE_MATRIX, matrix);
    let titles: TitleIndex = ["1984", "Brave New World", "Fahrenheit 451", "Emma"]
        .iter()
        .map(|t| (*t).to_string())
        .collect();
    write(&temp, categories::BOOKS_KNN, files::BOOK_MAPPING, titles);
    temp
}

fn curio(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("curio").unwrap();
    cmd.arg("--root").arg(root.path());
    cmd
}

#[test]
fn test_recommend_prints_json_per_title() {
    let root = books_root();
    let output = curio(&root)
        .args(["recommend", "books.knn", "1984", "Middlemarch", "-n", "2", "--seed", "7"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let picks = json["recommendations"]["1984"].as_array().unwrap();
    assert_eq!(picks.len(), 2);
    assert!(picks.iter().all(|t| t != "1984"));
    assert_eq!(json["recommendations"]["Middlemarch"], "Book not found");
    assert_eq!(json["non_personalized"], serde_json::json!([]));
}

#[test]
fn test_recommend_marks_fallback_titles() {
    let root = TempDir::new().unwrap();
    let output = curio(&root)
        .args(["recommend", "books.nn", "Emma", "-n", "3", "--seed", "5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["recommendations"]["Emma"].as_array().unwrap().len(), 3);
    assert_eq!(json["non_personalized"], serde_json::json!(["Emma"]));
}

#[test]
fn test_recommend_is_reproducible_with_seed() {
    let root = books_root();
    let run = || {
        curio(&root)
            .args(["recommend", "books.knn", "1984", "-n", "1", "--seed", "3"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_recommend_unavailable_movies() {
    let root = TempDir::new().unwrap();
    curio(&root)
        .args(["recommend", "movies.knn", "Heat"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Movie recommendations are currently unavailable"));
}

#[test]
fn test_recommend_rejects_bad_family() {
    let root = TempDir::new().unwrap();
    curio(&root)
        .args(["recommend", "podcasts.knn", "Serial"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid family id"));

    curio(&root)
        .args(["recommend", "books.tfidf", "Emma"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown recommender family"));
}

#[test]
fn test_genres_reports_unknown_genre() {
    let root = TempDir::new().unwrap();
    let columns = vec!["Comedy".to_string()];
    write(
        &root,
        categories::MOVIES_GRHR,
        files::GRHR_TABLE,
        ItemTable::new(
            columns,
            Vec::new(),
            vec![ItemRecord::new("Airplane!").with_genres(["Comedy"]).with_rating(4.1)],
        ),
    );

    curio(&root)
        .args(["genres", "Comedy", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Airplane!"));

    curio(&root)
        .args(["genres", "Comedy", "Foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Genre 'Foo' not found."));
}

#[test]
fn test_probe_lists_family_availability() {
    let root = books_root();
    let output = curio(&root).args(["probe", "--json"]).assert().success().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let families = json["families"].as_array().unwrap();
    assert_eq!(families.len(), 12);
    let books_knn = families.iter().find(|f| f["family"] == "books.knn").unwrap();
    assert_eq!(books_knn["available"], true);
    let grhr = families.iter().find(|f| f["family"] == "movies.grhr").unwrap();
    assert_eq!(grhr["available"], false);
}

#[test]
fn test_invalid_config_fails() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join(".curio")).unwrap();
    std::fs::write(
        root.path().join(".curio").join("config.toml"),
        "[recommend]\ndefault_n = 0\n",
    )
    .unwrap();

    curio(&root)
        .args(["recommend", "books.knn", "1984"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open artifact root"));
}
