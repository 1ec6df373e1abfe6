//! `[recommend]` configuration.

use curio_artifacts::ArtifactLayout;
use curio_models::{read_config_section, ConfigLoadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-family overrides, keyed by family id (`movies.knn`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyOverride {
    /// Candidate pool size replacing the family default.
    #[serde(default)]
    pub pool_size: Option<usize>,
}

/// Recommendation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Results per title when the caller does not ask for a count (default: 5).
    #[serde(default = "default_n")]
    pub default_n: usize,

    #[serde(default)]
    pub families: BTreeMap<String, FamilyOverride>,
}

fn default_n() -> usize {
    5
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { default_n: default_n(), families: BTreeMap::new() }
    }
}

impl RecommendConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_n == 0 {
            return Err("default_n must be greater than 0".to_string());
        }
        for (family, overrides) in &self.families {
            if overrides.pool_size == Some(0) {
                return Err(format!("pool_size for '{family}' must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Configured pool size for a family, if any.
    #[must_use]
    pub fn pool_size(&self, family: &str) -> Option<usize> {
        self.families.get(family).and_then(|o| o.pool_size)
    }
}

/// Load `[recommend]` from `<root>/.curio/config.toml`, with defaults when the
/// file or section is missing.
///
/// # Errors
/// Returns error if the config file exists but cannot be read, parsed or
/// validated.
pub fn load_recommend_config(root: &Path) -> Result<RecommendConfig, ConfigLoadError> {
    let config_path = ArtifactLayout::new(root).config_path();
    let Some(section) = read_config_section(&config_path, &["recommend"])? else {
        return Ok(RecommendConfig::default());
    };

    let config: RecommendConfig = section.try_into()?;
    config
        .validate()
        .map_err(|e| ConfigLoadError::Validation(format!("Invalid recommend configuration: {e}")))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, content: &str) {
        let dir = temp.path().join(".curio");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), content).unwrap();
    }

    #[test]
    fn test_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let config = load_recommend_config(temp.path()).unwrap();
        assert_eq!(config, RecommendConfig::default());
        assert_eq!(config.default_n, 5);
    }

    #[test]
    fn test_family_overrides() {
        let temp = TempDir::new().unwrap();
        write_config(
            &temp,
            r#"
[models.cache]
enabled = true

[recommend]
default_n = 3

[recommend.families."movies.knn"]
pool_size = 40
"#,
        );

        let config = load_recommend_config(temp.path()).unwrap();
        assert_eq!(config.default_n, 3);
        assert_eq!(config.pool_size("movies.knn"), Some(40));
        assert_eq!(config.pool_size("books.knn"), None);
    }

    #[test]
    fn test_validation() {
        let temp = TempDir::new().unwrap();
        write_config(&temp, "[recommend.families.\"books.knn\"]\npool_size = 0\n");
        assert!(matches!(
            load_recommend_config(temp.path()),
            Err(ConfigLoadError::Validation(_))
        ));

        write_config(&temp, "[recommend]\ndefault_n = 0\n");
        assert!(matches!(
            load_recommend_config(temp.path()),
            Err(ConfigLoadError::Validation(_))
        ));
    }
}
