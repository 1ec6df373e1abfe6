//! Probe command implementation.

use anyhow::Result;
use colored::Colorize;
use curio_models::{MemoryProbe, SystemMemoryProbe};
use curio_recommend::RecommendationService;
use serde_json::json;
use std::path::Path;

/// Execute the probe command.
pub fn execute(root: &Path, json_output: bool) -> Result<()> {
    let service = super::open_service(root)?;
    let usage = SystemMemoryProbe::new().usage_percent();

    if json_output {
        let families: Vec<_> = service
            .family_ids()
            .map(|id| {
                json!({
                    "family": id.to_string(),
                    "category": category(&service, id),
                    "available": service.is_available(id),
                })
            })
            .collect();
        let output = json!({
            "root": root.display().to_string(),
            "memory_usage_percent": usage,
            "cache": service.models().config(),
            "families": families,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Curio Probe".bold().cyan());
    println!();
    println!("{}", "Artifact root:".bold());
    println!("  {}", root.display());
    println!();
    println!("{}", "Memory:".bold());
    match usage {
        Some(percent) => println!("  Usage: {percent:.1}%"),
        None => println!("  Usage: {}", "unknown".yellow()),
    }
    println!();
    println!("{}", "Families:".bold());
    for id in service.family_ids() {
        let status = if service.is_available(id) {
            "available".green()
        } else {
            "missing".red()
        };
        println!("  {:<22} {:<22} {}", id.to_string(), category(&service, id), status);
    }
    Ok(())
}

fn category<'a>(service: &'a RecommendationService, id: &curio_abstraction::FamilyId) -> &'a str {
    service
        .family(id)
        .map_or_else(|| service.genre_filter().category(), |family| family.category())
}
