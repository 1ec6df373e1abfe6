//! Genres command implementation.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

/// Execute the genres command.
///
/// A genre-filter failure is reported as `{"error": "..."}` on stdout.
pub fn execute(root: &Path, genres: &[String], n: Option<usize>, seed: Option<u64>) -> Result<()> {
    let service = super::open_service(root)?;
    let mut rng = super::rng(seed);
    let names: Vec<&str> = genres.iter().map(String::as_str).collect();

    let output = match service.recommend_by_genres(&names, n, &mut rng) {
        Ok(titles) => json!(titles),
        Err(e) => json!({ "error": e.to_string() }),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
