//! Recommendation abstraction layer for Curio.
//!
//! This crate defines the shared types every recommender family speaks: the
//! catalog domain, title batches, per-title outcomes, the genre vocabulary and
//! the `Recommender` trait itself.

use rand::RngCore;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

/// The item catalog a recommender works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Book catalog.
    Books,
    /// Movie catalog.
    Movies,
}

impl Domain {
    /// Directory name of the domain under an artifact root.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Movies => "movies",
        }
    }

    /// Singular noun used in user-facing sentinels ("Book not found").
    #[must_use]
    pub const fn item_noun(self) -> &'static str {
        match self {
            Self::Books => "Book",
            Self::Movies => "Movie",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "books" | "book" => Ok(Self::Books),
            "movies" | "movie" => Ok(Self::Movies),
            _ => Err(()),
        }
    }
}

/// Identifies one recommender family, e.g. `movies.knn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyId {
    /// Catalog the family recommends from.
    pub domain: Domain,
    /// Family name within the domain (`knn`, `embeddings`, ...).
    pub name: String,
}

impl FamilyId {
    /// Create a family identifier.
    pub fn new(domain: Domain, name: impl Into<String>) -> Self {
        Self { domain, name: name.into() }
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.name)
    }
}

impl FromStr for FamilyId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, name) = s.split_once('.').ok_or(())?;
        if name.is_empty() {
            return Err(());
        }
        Ok(Self::new(domain.parse()?, name))
    }
}

/// One or more requested titles.
///
/// A single title is normalized to a one-element batch so every recommender
/// only ever iterates a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleBatch(Vec<String>);

impl TitleBatch {
    /// Build a batch from any iterator of titles.
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(titles.into_iter().map(Into::into).collect())
    }
}

impl Deref for TitleBatch {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for TitleBatch {
    fn from(title: &str) -> Self {
        Self(vec![title.to_string()])
    }
}

impl From<String> for TitleBatch {
    fn from(title: String) -> Self {
        Self(vec![title])
    }
}

impl From<Vec<String>> for TitleBatch {
    fn from(titles: Vec<String>) -> Self {
        Self(titles)
    }
}

impl From<Vec<&str>> for TitleBatch {
    fn from(titles: Vec<&str>) -> Self {
        Self::new(titles)
    }
}

impl From<&[&str]> for TitleBatch {
    fn from(titles: &[&str]) -> Self {
        Self::new(titles.iter().copied())
    }
}

/// Per-request knobs shared by all families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendParams {
    /// Number of recommendations per title.
    pub n: usize,
    /// Candidate pool to sample from; `None` uses the family default.
    #[serde(default)]
    pub pool_size: Option<usize>,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self { n: 5, pool_size: None }
    }
}

impl RecommendParams {
    /// Parameters asking for `n` results.
    #[must_use]
    pub fn with_n(n: usize) -> Self {
        Self { n, pool_size: None }
    }

    /// Override the family's candidate pool size.
    #[must_use]
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }
}

/// What happened to one requested title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    /// Personalized recommendations, best-effort ordered.
    Recommended(Vec<String>),
    /// Non-personalized sample from a fixed catalog (artifacts unavailable).
    Fallback(Vec<String>),
    /// The title could not be matched against the title index.
    NotFound,
    /// The family's artifacts could not be loaded.
    Unavailable,
    /// Ranking failed for this title; the message explains why.
    Failed(String),
}

impl TitleOutcome {
    /// Recommended titles, if the outcome carries any.
    #[must_use]
    pub fn titles(&self) -> Option<&[String]> {
        match self {
            Self::Recommended(titles) | Self::Fallback(titles) => Some(titles),
            _ => None,
        }
    }

    /// Whether the titles come from the fallback catalog.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The sentinel string handed to the web layer for non-list outcomes.
    #[must_use]
    pub fn sentinel(&self, domain: Domain) -> Option<String> {
        match self {
            Self::Recommended(_) | Self::Fallback(_) => None,
            Self::NotFound => Some(format!("{} not found", domain.item_noun())),
            Self::Unavailable => Some(format!(
                "{} recommendations are currently unavailable",
                domain.item_noun()
            )),
            Self::Failed(message) => Some(message.clone()),
        }
    }
}

/// Ordered mapping from requested title (as given) to its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    domain: Domain,
    entries: Vec<(String, TitleOutcome)>,
}

impl Recommendations {
    /// Empty result set for a domain.
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self { domain, entries: Vec::new() }
    }

    /// Record the outcome for a title. A repeated title replaces its earlier entry.
    pub fn insert(&mut self, title: impl Into<String>, outcome: TitleOutcome) {
        let title = title.into();
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == title) {
            entry.1 = outcome;
        } else {
            self.entries.push((title, outcome));
        }
    }

    /// Outcome recorded for a title.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&TitleOutcome> {
        self.entries.iter().find(|(t, _)| t == title).map(|(_, outcome)| outcome)
    }

    /// Iterate entries in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TitleOutcome)> {
        self.entries.iter().map(|(title, outcome)| (title.as_str(), outcome))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn domain(&self) -> Domain {
        self.domain
    }

    /// Requested titles whose entry is a fallback catalog sample.
    #[must_use]
    pub fn fallback_titles(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_fallback())
            .map(|(title, _)| title.clone())
            .collect()
    }

    /// Pair the map with its non-personalized titles for serialization.
    #[must_use]
    pub fn marked<'a>(&'a self, fallback: &'a [String]) -> MarkedRecommendations<'a> {
        MarkedRecommendations { recommendations: self, non_personalized: fallback }
    }
}

/// Serializes as the `{title: [..] | "<sentinel>"}` map the web layer expects.
///
/// Fallback samples look like recommendations in this map; use
/// [`Recommendations::marked`] where the output must say which titles are
/// non-personalized.
impl Serialize for Recommendations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (title, outcome) in &self.entries {
            match outcome.titles() {
                Some(titles) => map.serialize_entry(title, titles)?,
                None => map.serialize_entry(title, &outcome.sentinel(self.domain))?,
            }
        }
        map.end()
    }
}

/// Result map plus the requested titles answered from the fallback catalog.
///
/// Serializes as `{"recommendations": {..}, "non_personalized": [..]}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarkedRecommendations<'a> {
    pub recommendations: &'a Recommendations,
    pub non_personalized: &'a [String],
}

/// Errors raised while ranking candidates for a single resolved title.
///
/// These never escape a recommender; they are converted to
/// [`TitleOutcome::Failed`] for the offending title.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// A vector did not have the expected dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension the artifact declares.
        expected: usize,
        /// Dimension actually observed.
        got: usize,
    },

    /// A feature row was malformed (wrong length, non-finite values, ...).
    #[error("malformed feature vector: {0}")]
    MalformedFeatures(String),

    /// The text encoder could not encode the query.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// A title index pointed outside the feature rows.
    #[error("index {index} out of range for {len} rows")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of rows available.
        len: usize,
    },
}

/// Genres understood by the genre-filter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    FilmNoir,
    Horror,
    Imax,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in column order.
    pub const ALL: [Self; 19] = [
        Self::Action,
        Self::Adventure,
        Self::Animation,
        Self::Children,
        Self::Comedy,
        Self::Crime,
        Self::Documentary,
        Self::Drama,
        Self::Fantasy,
        Self::FilmNoir,
        Self::Horror,
        Self::Imax,
        Self::Musical,
        Self::Mystery,
        Self::Romance,
        Self::SciFi,
        Self::Thriller,
        Self::War,
        Self::Western,
    ];

    /// Column name as written in item tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Adventure => "Adventure",
            Self::Animation => "Animation",
            Self::Children => "Children",
            Self::Comedy => "Comedy",
            Self::Crime => "Crime",
            Self::Documentary => "Documentary",
            Self::Drama => "Drama",
            Self::Fantasy => "Fantasy",
            Self::FilmNoir => "Film-Noir",
            Self::Horror => "Horror",
            Self::Imax => "IMAX",
            Self::Musical => "Musical",
            Self::Mystery => "Mystery",
            Self::Romance => "Romance",
            Self::SciFi => "Sci-Fi",
            Self::Thriller => "Thriller",
            Self::War => "War",
            Self::Western => "Western",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s || genre.as_str().to_lowercase() == s)
            .ok_or(())
    }
}

/// Structured failures of the genre-filter family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenreFilterError {
    /// A requested genre is not part of the vocabulary or the item table.
    #[error("Genre '{0}' not found.")]
    UnknownGenre(String),

    /// No rated item carries every requested genre.
    #[error("No matching movies found for selected genres.")]
    NoMatches,

    /// The genre table could not be loaded.
    #[error("Genre recommendations are currently unavailable.")]
    Unavailable,
}

impl GenreFilterError {
    /// Stable machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownGenre(_) => "unknown_genre",
            Self::NoMatches => "no_matches",
            Self::Unavailable => "unavailable",
        }
    }
}

impl Serialize for GenreFilterError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("error", &self.to_string())?;
        map.serialize_entry("kind", self.kind())?;
        map.end()
    }
}

/// A recommender family.
///
/// Implementations must never panic or surface errors for missing artifacts,
/// unknown titles or per-title ranking failures: every condition degrades to
/// a [`TitleOutcome`].
pub trait Recommender: Send + Sync {
    /// The family this recommender implements.
    fn family(&self) -> &FamilyId;

    /// Recommend items for every title in the batch.
    ///
    /// # Arguments
    /// * `titles` - Requested titles, processed independently
    /// * `params` - Result count and optional pool override
    /// * `rng` - Random source used for sampling
    fn recommend(
        &self,
        titles: &TitleBatch,
        params: &RecommendParams,
        rng: &mut dyn RngCore,
    ) -> Recommendations;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_title_becomes_batch() {
        let batch = TitleBatch::from("Dune");
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0], "Dune");
    }

    #[test]
    fn test_family_id_roundtrip_display() {
        let id: FamilyId = "movies.knn".parse().unwrap();
        assert_eq!(id.domain, Domain::Movies);
        assert_eq!(id.name, "knn");
        assert_eq!(id.to_string(), "movies.knn");
        assert!("movies".parse::<FamilyId>().is_err());
        assert!("games.knn".parse::<FamilyId>().is_err());
    }

    #[test]
    fn test_recommendations_keep_request_order() {
        let mut recs = Recommendations::new(Domain::Books);
        recs.insert("b", TitleOutcome::NotFound);
        recs.insert("a", TitleOutcome::Recommended(vec!["x".to_string()]));
        recs.insert("b", TitleOutcome::Unavailable);

        let titles: Vec<&str> = recs.iter().map(|(t, _)| t).collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert_eq!(recs.get("b"), Some(&TitleOutcome::Unavailable));
    }

    #[test]
    fn test_recommendations_serialize_sentinels() {
        let mut recs = Recommendations::new(Domain::Movies);
        recs.insert("Heat", TitleOutcome::Recommended(vec!["Ronin".to_string()]));
        recs.insert("Nope", TitleOutcome::NotFound);
        recs.insert("Gone", TitleOutcome::Unavailable);

        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(json["Heat"], serde_json::json!(["Ronin"]));
        assert_eq!(json["Nope"], "Movie not found");
        assert_eq!(json["Gone"], "Movie recommendations are currently unavailable");
    }

    #[test]
    fn test_fallback_titles_are_marked() {
        let mut recs = Recommendations::new(Domain::Books);
        recs.insert("Emma", TitleOutcome::Recommended(vec!["Persuasion".to_string()]));
        recs.insert("Unknown", TitleOutcome::Fallback(vec!["1984".to_string()]));

        let fallback = recs.fallback_titles();
        assert_eq!(fallback, vec!["Unknown".to_string()]);

        let json = serde_json::to_value(recs.marked(&fallback)).unwrap();
        assert_eq!(json["recommendations"]["Unknown"], serde_json::json!(["1984"]));
        assert_eq!(json["recommendations"]["Emma"], serde_json::json!(["Persuasion"]));
        assert_eq!(json["non_personalized"], serde_json::json!(["Unknown"]));
    }

    #[test]
    fn test_genre_parsing() {
        assert_eq!("Film-Noir".parse::<Genre>(), Ok(Genre::FilmNoir));
        assert_eq!("sci-fi".parse::<Genre>(), Ok(Genre::SciFi));
        assert_eq!("IMAX".parse::<Genre>(), Ok(Genre::Imax));
        assert!("Foo".parse::<Genre>().is_err());
    }

    #[test]
    fn test_genre_error_serializes_as_object() {
        let err = GenreFilterError::UnknownGenre("Foo".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "Genre 'Foo' not found.");
        assert_eq!(json["kind"], "unknown_genre");
    }
}
