//! Genre-filter recommendations (GRHR: genre rating high-rank).

use curio_abstraction::{FamilyId, Genre, GenreFilterError};
use curio_artifacts::{Artifact, ItemRecord};
use curio_models::ModelCache;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, warn};

/// How many of the best-rated matches are sampled from.
pub const TOP_RATED_POOL: usize = 25;

/// Recommends items flagged with every requested genre, sampled from the
/// best-rated matches.
#[derive(Debug)]
pub struct GenreFilterRecommender {
    id: FamilyId,
    models: Arc<ModelCache>,
    category: String,
    file: String,
    pool: usize,
}

impl GenreFilterRecommender {
    pub fn new(
        id: FamilyId,
        models: Arc<ModelCache>,
        category: impl Into<String>,
        file: impl Into<String>,
    ) -> Self {
        Self { id, models, category: category.into(), file: file.into(), pool: TOP_RATED_POOL }
    }

    #[must_use]
    pub fn family(&self) -> &FamilyId {
        &self.id
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Recommend up to `n` titles carrying every genre in `genres`.
    ///
    /// # Errors
    /// - `UnknownGenre` for the first genre outside the vocabulary or the table
    /// - `NoMatches` when no rated item carries every genre
    /// - `Unavailable` when the genre table cannot be loaded
    pub fn recommend_by_genres(
        &self,
        genres: &[&str],
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<String>, GenreFilterError> {
        let Some(artifact) = self.models.get_model(&self.category, &self.file) else {
            warn!(family = %self.id, "Genre table unavailable");
            return Err(GenreFilterError::Unavailable);
        };
        let Artifact::ItemTable(table) = artifact.as_ref() else {
            warn!(family = %self.id, kind = %artifact.kind(), "Genre table has unexpected kind");
            return Err(GenreFilterError::Unavailable);
        };

        let mut columns = Vec::with_capacity(genres.len());
        for name in genres {
            let column = name
                .parse::<Genre>()
                .ok()
                .map(Genre::as_str)
                .filter(|column| table.has_genre_column(column))
                .ok_or_else(|| GenreFilterError::UnknownGenre((*name).to_string()))?;
            columns.push(column);
        }

        let mut matches: Vec<(&ItemRecord, f64)> = table
            .items()
            .iter()
            .filter(|item| columns.iter().all(|column| item.has_genre(column)))
            .filter_map(|item| item.avg_rating.filter(|r| r.is_finite()).map(|r| (item, r)))
            .collect();
        if matches.is_empty() {
            debug!(family = %self.id, ?genres, "No rated items for genres");
            return Err(GenreFilterError::NoMatches);
        }

        matches.sort_by(|a, b| b.1.total_cmp(&a.1));
        matches.truncate(self.pool);

        Ok(matches
            .choose_multiple(rng, n.min(matches.len()))
            .map(|(item, _)| item.title.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use curio_abstraction::Domain;
    use curio_artifacts::{categories, files, ItemTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grhr(fixture: &Fixture) -> GenreFilterRecommender {
        GenreFilterRecommender::new(
            FamilyId::new(Domain::Movies, "grhr"),
            Arc::clone(&fixture.models),
            categories::MOVIES_GRHR,
            files::GRHR_TABLE,
        )
    }

    fn write_table(fixture: &Fixture, items: Vec<ItemRecord>) {
        let columns = Genre::ALL.iter().map(|g| g.as_str().to_string()).collect();
        fixture.write(
            categories::MOVIES_GRHR,
            files::GRHR_TABLE,
            ItemTable::new(columns, Vec::new(), items),
        );
    }

    #[test]
    fn test_all_genres_required_and_unrated_dropped() {
        let fixture = Fixture::new();
        write_table(
            &fixture,
            vec![
                ItemRecord::new("Airplane!").with_genres(["Comedy"]).with_rating(4.1),
                ItemRecord::new("Shaun of the Dead")
                    .with_genres(["Comedy", "Horror"])
                    .with_rating(4.0),
                ItemRecord::new("Unrated Scream").with_genres(["Comedy", "Horror"]),
                ItemRecord::new("Alien").with_genres(["Horror", "Sci-Fi"]).with_rating(4.3),
            ],
        );
        let mut rng = StdRng::seed_from_u64(1);

        let picked = grhr(&fixture).recommend_by_genres(&["Comedy", "Horror"], 5, &mut rng);
        assert_eq!(picked, Ok(vec!["Shaun of the Dead".to_string()]));
    }

    #[test]
    fn test_samples_from_top_rated() {
        let fixture = Fixture::new();
        let items = (0..40)
            .map(|i| {
                ItemRecord::new(format!("Drama {i}"))
                    .with_genres(["Drama"])
                    .with_rating(f64::from(i) / 10.0)
            })
            .collect();
        write_table(&fixture, items);
        let recommender = grhr(&fixture);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            let picked = recommender.recommend_by_genres(&["drama"], 5, &mut rng).unwrap();
            assert_eq!(picked.len(), 5);
            // top 25 by rating are Drama 15..=39
            for title in &picked {
                let rank: u32 = title.trim_start_matches("Drama ").parse().unwrap();
                assert!(rank >= 15);
            }
        }
    }

    #[test]
    fn test_unknown_genre_is_structured_error() {
        let fixture = Fixture::new();
        write_table(&fixture, vec![ItemRecord::new("Airplane!").with_genres(["Comedy"]).with_rating(4.1)]);
        let mut rng = StdRng::seed_from_u64(1);

        let err = grhr(&fixture).recommend_by_genres(&["Comedy", "Foo"], 5, &mut rng).unwrap_err();
        assert_eq!(err, GenreFilterError::UnknownGenre("Foo".to_string()));
        assert_eq!(err.to_string(), "Genre 'Foo' not found.");
    }

    #[test]
    fn test_no_matches_and_unavailable() {
        let fixture = Fixture::new();
        let recommender = grhr(&fixture);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            recommender.recommend_by_genres(&["Comedy"], 5, &mut rng),
            Err(GenreFilterError::Unavailable)
        );

        write_table(&fixture, vec![ItemRecord::new("Heat").with_genres(["Crime"]).with_rating(4.0)]);
        assert_eq!(
            recommender.recommend_by_genres(&["Western"], 5, &mut rng),
            Err(GenreFilterError::NoMatches)
        );
    }
}
