//! Degraded-data handling: what a family answers when its artifacts are gone.

use crate::sampling::sample_titles;
use curio_abstraction::TitleOutcome;
use rand::RngCore;

/// Generic titles handed out by the book genre family when its data is missing.
pub const GENERIC_BOOKS: &[&str] = &[
    "The Great Gatsby",
    "To Kill a Mockingbird",
    "1984",
    "Pride and Prejudice",
    "The Catcher in the Rye",
    "Lord of the Rings",
    "Harry Potter and the Philosopher's Stone",
    "The Hobbit",
    "Dune",
    "Fahrenheit 451",
];

/// Wider generic catalog used by the other book families.
pub const EXTENDED_BOOKS: &[&str] = &[
    "The Great Gatsby",
    "To Kill a Mockingbird",
    "1984",
    "Pride and Prejudice",
    "The Catcher in the Rye",
    "Lord of the Rings",
    "Harry Potter and the Philosopher's Stone",
    "The Hobbit",
    "Dune",
    "Fahrenheit 451",
    "The Chronicles of Narnia",
    "Jane Eyre",
    "Wuthering Heights",
    "Brave New World",
    "The Picture of Dorian Gray",
];

/// Per-family answer when artifacts cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedPolicy {
    /// Sample a fixed catalog, marked as [`TitleOutcome::Fallback`].
    Fallback(&'static [&'static str]),
    /// Mark every title [`TitleOutcome::Unavailable`].
    Unavailable,
}

impl DegradedPolicy {
    /// Outcome for one title while the family is degraded.
    pub fn outcome(self, n: usize, rng: &mut dyn RngCore) -> TitleOutcome {
        match self {
            Self::Fallback(catalog) => TitleOutcome::Fallback(sample_titles(catalog, n, rng)),
            Self::Unavailable => TitleOutcome::Unavailable,
        }
    }
}
