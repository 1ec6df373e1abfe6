//! Cache configuration loading from the artifact root's config file.

use crate::cache::CacheConfig;
use curio_artifacts::ArtifactLayout;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// I/O error reading config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration validation error.
    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Read a nested section (e.g. `["models", "cache"]`) of `config.toml`.
///
/// Returns `Ok(None)` when the file or the section does not exist.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn read_config_section(
    config_path: &Path,
    section: &[&str],
) -> Result<Option<toml::Value>, ConfigLoadError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path)?;
    let table: toml::Table = toml::from_str(&content)?;

    let mut current = &table;
    let Some((last, parents)) = section.split_last() else {
        return Ok(Some(toml::Value::Table(table)));
    };
    for name in parents {
        match current.get(*name).and_then(toml::Value::as_table) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(current.get(*last).cloned())
}

/// Load cache configuration from `<root>/.curio/config.toml`.
///
/// If the file or the `[models.cache]` section is missing, returns the
/// default configuration.
///
/// # Errors
/// Returns error if the config file exists but cannot be read, parsed or
/// validated.
pub fn load_cache_config(root: &Path) -> Result<CacheConfig, ConfigLoadError> {
    let config_path = ArtifactLayout::new(root).config_path();

    let Some(section) = read_config_section(&config_path, &["models", "cache"])? else {
        return Ok(CacheConfig::default());
    };

    let cache_config: CacheConfig = section.try_into()?;
    cache_config
        .validate()
        .map_err(|e| ConfigLoadError::Validation(format!("Invalid cache configuration: {e}")))?;

    Ok(cache_config)
}
