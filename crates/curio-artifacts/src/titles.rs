//! Title index: canonical title <-> dense row position.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Bijective mapping between canonical titles and row positions.
///
/// Built once when the owning artifact is deserialized. When a title occurs
/// more than once the first position wins for lookups; the row itself keeps
/// its title so reverse lookups stay exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TitleIndex {
    titles: Vec<String>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

/// Case-folded form used for case-insensitive lookups.
#[must_use]
pub fn fold_title(title: &str) -> String {
    title.trim().to_lowercase()
}

impl From<Vec<String>> for TitleIndex {
    fn from(titles: Vec<String>) -> Self {
        let mut exact = HashMap::with_capacity(titles.len());
        let mut folded = HashMap::with_capacity(titles.len());
        let mut duplicates = 0usize;
        for (pos, title) in titles.iter().enumerate() {
            match exact.entry(title.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(pos);
                }
                Entry::Occupied(_) => duplicates += 1,
            }
            folded.entry(fold_title(title)).or_insert(pos);
        }
        if duplicates > 0 {
            debug!(duplicates, "Title index contains repeated titles");
        }
        Self { titles, exact, folded }
    }
}

impl From<TitleIndex> for Vec<String> {
    fn from(index: TitleIndex) -> Self {
        index.titles
    }
}

impl FromIterator<String> for TitleIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl TitleIndex {
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Title stored at a position.
    #[must_use]
    pub fn title(&self, pos: usize) -> Option<&str> {
        self.titles.get(pos).map(String::as_str)
    }

    /// Case-sensitive exact lookup.
    #[must_use]
    pub fn position(&self, title: &str) -> Option<usize> {
        self.exact.get(title).copied()
    }

    /// Trimmed, case-insensitive exact lookup.
    #[must_use]
    pub fn position_folded(&self, title: &str) -> Option<usize> {
        self.folded.get(&fold_title(title)).copied()
    }

    /// Titles in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.titles.iter().map(String::as_str).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> TitleIndex {
        TitleIndex::from(vec!["Dune".to_string(), "Emma".to_string(), "Dune".to_string()])
    }

    #[test]
    fn test_exact_lookup_is_case_sensitive() {
        let idx = index();
        assert_eq!(idx.position("Emma"), Some(1));
        assert_eq!(idx.position("emma"), None);
    }

    #[test]
    fn test_folded_lookup_trims_and_lowercases() {
        let idx = index();
        assert_eq!(idx.position_folded("  EMMA "), Some(1));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let idx = index();
        assert_eq!(idx.position("Dune"), Some(0));
        assert_eq!(idx.title(2), Some("Dune"));
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_string(&index()).unwrap();
        assert_eq!(json, r#"["Dune","Emma","Dune"]"#);
        let back: TitleIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position("Emma"), Some(1));
    }
}
