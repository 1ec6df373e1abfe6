//! Item tables: per-item metadata rows with a title index.

use crate::titles::TitleIndex;
use serde::{Deserialize, Serialize};

/// One catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    /// Genre columns flagged for this item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// Numeric features, aligned with the table's `feature_columns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<f32>,
}

impl ItemRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            avg_rating: None,
            genres: Vec::new(),
            features: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.avg_rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: Vec<f32>) -> Self {
        self.features = features;
        self
    }

    /// Whether the item is flagged with a genre column.
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Text used to embed the item: the description, or the title when the
    /// description is empty or the literal `nan` left by the offline export.
    #[must_use]
    pub fn embedding_text(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() && !d.eq_ignore_ascii_case("nan") => d,
            _ => self.title.as_str(),
        }
    }
}

/// A dataframe-like table of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItemTable", into = "RawItemTable")]
pub struct ItemTable {
    genre_columns: Vec<String>,
    feature_columns: Vec<String>,
    items: Vec<ItemRecord>,
    index: TitleIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawItemTable {
    #[serde(default)]
    genre_columns: Vec<String>,
    #[serde(default)]
    feature_columns: Vec<String>,
    items: Vec<ItemRecord>,
}

impl From<RawItemTable> for ItemTable {
    fn from(raw: RawItemTable) -> Self {
        Self::new(raw.genre_columns, raw.feature_columns, raw.items)
    }
}

impl From<ItemTable> for RawItemTable {
    fn from(table: ItemTable) -> Self {
        Self {
            genre_columns: table.genre_columns,
            feature_columns: table.feature_columns,
            items: table.items,
        }
    }
}

impl ItemTable {
    /// Build a table and its title index.
    #[must_use]
    pub fn new(
        genre_columns: Vec<String>,
        feature_columns: Vec<String>,
        items: Vec<ItemRecord>,
    ) -> Self {
        let index = items.iter().map(|item| item.title.clone()).collect();
        Self { genre_columns, feature_columns, items, index }
    }

    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, pos: usize) -> Option<&ItemRecord> {
        self.items.get(pos)
    }

    #[must_use]
    pub fn titles(&self) -> &TitleIndex {
        &self.index
    }

    #[must_use]
    pub fn genre_columns(&self) -> &[String] {
        &self.genre_columns
    }

    #[must_use]
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    #[must_use]
    pub fn has_genre_column(&self, genre: &str) -> bool {
        self.genre_columns.iter().any(|g| g == genre)
    }

    /// 0/1 vector of an item's genre flags in column order.
    #[must_use]
    pub fn genre_vector(&self, pos: usize) -> Option<Vec<f32>> {
        let item = self.items.get(pos)?;
        Some(
            self.genre_columns
                .iter()
                .map(|column| if item.has_genre(column) { 1.0 } else { 0.0 })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
