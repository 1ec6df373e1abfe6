use crate::artifact::ArtifactKind;
use crate::layout::ArtifactLayout;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Names of the standard model categories.
pub mod categories {
    pub const MOVIES_KNN: &str = "movies.knn";
    pub const MOVIES_TFIDF: &str = "movies.tfidf";
    pub const MOVIES_KNN_GENRE: &str = "movies.knn_genre";
    pub const MOVIES_GENRE_BASED: &str = "movies.genre_based";
    pub const MOVIES_EMBEDDINGS: &str = "movies.embeddings";
    pub const MOVIES_NN: &str = "movies.nn";
    pub const MOVIES_GRHR: &str = "movies.grhr";
    pub const BOOKS_KNN: &str = "books.knn";
    pub const BOOKS_GENRE_KNN: &str = "books.genre_knn";
    pub const BOOKS_EMBEDDINGS: &str = "books.embeddings";
    pub const BOOKS_NN: &str = "books.nn";
}

/// File names declared by the standard categories.
pub mod files {
    pub const KNN_MODEL: &str = "knn_model.json";
    pub const SPARSE_MATRIX: &str = "sparse_matrix.json";
    pub const MOVIE_MAPPING: &str = "movie_mapping.json";
    pub const BOOK_MAPPING: &str = "book_mapping.json";
    pub const TFIDF_NN_MODEL: &str = "nn_model.json";
    pub const TFIDF_TITLES: &str = "title_to_index.json";
    pub const TFIDF_MATRIX: &str = "tfidf_matrix.json";
    pub const GENRE_KNN_MODEL: &str = "genre_knn_model.json";
    pub const GENRE_MOVIES: &str = "genre_movies.json";
    pub const GENRE_BASED_MATRIX: &str = "genre_based_matrix.json";
    pub const GENRE_BASED_TITLES: &str = "title_index_genre_based.json";
    pub const MOVIES_TABLE: &str = "movies.json";
    pub const MOVIE_EMBEDDINGS: &str = "movie_embeddings.json";
    pub const FINAL_MOVIE_DATA: &str = "final_movie_data.json";
    pub const GRHR_TABLE: &str = "grhr.json";
    pub const BOOKS_DF: &str = "books_df.json";
    pub const CATEGORY_KNN_SPARSE: &str = "category_knn_sparse.json";
    pub const BOOKS_TABLE: &str = "books.json";
    pub const BOOK_EMBEDDINGS: &str = "book_embeddings.json";
    pub const FINAL_BOOK_DATA: &str = "final_book_data.json";
}

/// A file a category is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub name: String,
    pub kind: ArtifactKind,
}

/// A named model category: a directory plus its declared file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub name: String,
    /// Directory relative to the artifact root.
    pub dir: PathBuf,
    pub files: Vec<FileSpec>,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), dir: dir.into(), files: Vec::new() }
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, kind: ArtifactKind) -> Self {
        self.files.push(FileSpec { name: name.into(), kind });
        self
    }

    /// Declared kind of a file, if the file is part of the category.
    #[must_use]
    pub fn declared_kind(&self, file: &str) -> Option<ArtifactKind> {
        self.files.iter().find(|f| f.name == file).map(|f| f.kind)
    }

    /// Whether at least one declared file exists on disk.
    #[must_use]
    pub fn any_file_present(&self, layout: &ArtifactLayout) -> bool {
        self.files.iter().any(|f| {
            layout
                .file_path(self, &f.name)
                .is_ok_and(|path| path.is_file())
        })
    }
}

/// The set of categories a loader knows about.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    categories: BTreeMap<String, CategorySpec>,
}

impl ArtifactRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every standard book and movie category.
    #[must_use]
    pub fn standard() -> Self {
        use ArtifactKind::{DenseMatrix, ItemTable, NeighborIndex, SparseMatrix, TitleTable};

        let mut registry = Self::new();
        registry.register(
            CategorySpec::new(categories::MOVIES_KNN, "movies/KNN")
                .with_file(files::KNN_MODEL, NeighborIndex)
                .with_file(files::MOVIE_MAPPING, TitleTable)
                .with_file(files::SPARSE_MATRIX, SparseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_TFIDF, "movies/BOW")
                .with_file(files::TFIDF_NN_MODEL, NeighborIndex)
                .with_file(files::TFIDF_TITLES, TitleTable)
                .with_file(files::TFIDF_MATRIX, SparseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_KNN_GENRE, "movies/GenreKnn")
                .with_file(files::GENRE_KNN_MODEL, NeighborIndex)
                .with_file(files::GENRE_MOVIES, ItemTable),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_GENRE_BASED, "movies/Genre-Based")
                .with_file(files::GENRE_BASED_MATRIX, SparseMatrix)
                .with_file(files::GENRE_BASED_TITLES, TitleTable),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_EMBEDDINGS, "movies/Embeddings")
                .with_file(files::MOVIES_TABLE, ItemTable)
                .with_file(files::MOVIE_EMBEDDINGS, DenseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_NN, "movies/NN")
                .with_file(files::FINAL_MOVIE_DATA, ItemTable),
        );
        registry.register(
            CategorySpec::new(categories::MOVIES_GRHR, "movies/GRHR")
                .with_file(files::GRHR_TABLE, ItemTable),
        );
        registry.register(
            CategorySpec::new(categories::BOOKS_KNN, "books/KNN")
                .with_file(files::KNN_MODEL, NeighborIndex)
                .with_file(files::BOOK_MAPPING, TitleTable)
                .with_file(files::SPARSE_MATRIX, SparseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::BOOKS_GENRE_KNN, "books/Genre_knn")
                .with_file(files::BOOKS_DF, ItemTable)
                .with_file(files::CATEGORY_KNN_SPARSE, SparseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::BOOKS_EMBEDDINGS, "books/Embeddings")
                .with_file(files::BOOKS_TABLE, ItemTable)
                .with_file(files::BOOK_EMBEDDINGS, DenseMatrix),
        );
        registry.register(
            CategorySpec::new(categories::BOOKS_NN, "books/NN")
                .with_file(files::FINAL_BOOK_DATA, ItemTable),
        );
        registry
    }

    /// Add or replace a category.
    pub fn register(&mut self, spec: CategorySpec) {
        self.categories.insert(spec.name.clone(), spec);
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.get(name)
    }

    /// Categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &CategorySpec> {
        self.categories.values()
    }
}
