//! Title resolution against a title index.

use curio_artifacts::{fold_title, TitleIndex};
use serde::{Deserialize, Serialize};

/// How a requested title is matched against a family's title index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Case-sensitive exact lookup.
    #[default]
    Exact,
    /// Trimmed, lower-cased exact lookup.
    CaseInsensitive,
    /// Exact lookup, then case-insensitive substring containment in either
    /// direction. The first match in index order wins.
    ExactThenContains,
}

/// Resolve `title` to a position in `index`.
#[must_use]
pub fn resolve(index: &TitleIndex, title: &str, policy: MatchPolicy) -> Option<usize> {
    match policy {
        MatchPolicy::Exact => index.position(title),
        MatchPolicy::CaseInsensitive => index.position_folded(title),
        MatchPolicy::ExactThenContains => index.position(title).or_else(|| {
            let needle = title.to_lowercase();
            index
                .iter()
                .find(|(_, candidate)| {
                    let candidate = candidate.to_lowercase();
                    candidate.contains(&needle) || needle.contains(&candidate)
                })
                .map(|(pos, _)| pos)
        }),
    }
}

/// Whether two titles are the same once trimmed and lower-cased.
#[must_use]
pub fn same_title(a: &str, b: &str) -> bool {
    fold_title(a) == fold_title(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> TitleIndex {
        ["The Hobbit", "Dune", "Dune Messiah", "1984"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_exact_is_case_sensitive() {
        let index = index();
        assert_eq!(resolve(&index, "Dune", MatchPolicy::Exact), Some(1));
        assert_eq!(resolve(&index, "dune", MatchPolicy::Exact), None);
    }

    #[test]
    fn test_case_insensitive_trims() {
        let index = index();
        assert_eq!(resolve(&index, "  the hobbit ", MatchPolicy::CaseInsensitive), Some(0));
        assert_eq!(resolve(&index, "Hobbit", MatchPolicy::CaseInsensitive), None);
    }

    #[test]
    fn test_contains_first_match_wins() {
        let index = index();
        // "dune" is contained in both "Dune" and "Dune Messiah"
        assert_eq!(resolve(&index, "dune", MatchPolicy::ExactThenContains), Some(1));
        assert_eq!(resolve(&index, "Messiah", MatchPolicy::ExactThenContains), Some(2));
        // query contains the candidate
        assert_eq!(
            resolve(&index, "The Hobbit: Illustrated", MatchPolicy::ExactThenContains),
            Some(0)
        );
        assert_eq!(resolve(&index, "Neuromancer", MatchPolicy::ExactThenContains), None);
    }

    #[test]
    fn test_same_title() {
        assert!(same_title("Heat ", "heat"));
        assert!(!same_title("Heat", "Heat 2"));
    }
}
