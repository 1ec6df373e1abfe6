//! Recommend command implementation.

use anyhow::{anyhow, Result};
use curio_abstraction::{FamilyId, TitleBatch};
use std::path::Path;
use tracing::{info, warn};

/// Execute the recommend command.
///
/// Prints `{"recommendations": {..}, "non_personalized": [..]}`.
pub fn execute(
    root: &Path,
    family: &str,
    titles: &[String],
    n: Option<usize>,
    pool_size: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let id: FamilyId = family
        .parse()
        .map_err(|()| anyhow!("Invalid family id '{family}', expected <books|movies>.<name>"))?;
    let service = super::open_service(root)?;
    let mut rng = super::rng(seed);

    let batch = TitleBatch::new(titles);
    let results = service.recommend(&id, &batch, n, pool_size, &mut rng)?;
    info!(family = %id, titles = batch.len(), stats = ?service.models().stats(), "Request complete");

    let fallback = results.fallback_titles();
    if !fallback.is_empty() {
        warn!(family = %id, titles = ?fallback, "Answered from the fallback catalog");
    }
    println!("{}", serde_json::to_string_pretty(&results.marked(&fallback))?);
    Ok(())
}
