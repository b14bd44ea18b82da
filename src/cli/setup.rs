use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");
const CURRENCIES_KEY: &str = "currencies:";

/// Writes the example configuration to the default location.
pub fn setup(ids: &[String]) -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path, ids)
}

/// Writes the example configuration to `path`, listing `ids` as the default
/// currencies when any are given. An existing file is never overwritten.
pub fn setup_at_path<P: AsRef<Path>>(path: P, ids: &[String]) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, example_config(ids)?)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    info!(currencies = ids.len(), "Created configuration at {}", path.display());
    Ok(())
}

/// The example configuration with its `currencies` list replaced by `ids`.
pub fn example_config(ids: &[String]) -> Result<String> {
    if ids.is_empty() {
        return Ok(EXAMPLE_CONFIG.to_string());
    }

    // The list is the last entry of the example file
    let head = EXAMPLE_CONFIG
        .find(CURRENCIES_KEY)
        .map_or(EXAMPLE_CONFIG, |pos| &EXAMPLE_CONFIG[..pos]);
    let list = serde_yaml::to_string(ids).context("Failed to serialize currency list")?;
    Ok(format!("{head}{CURRENCIES_KEY}\n{list}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DEFAULT_FEED_URL, OutputFormat, RateLimitPolicy};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_config_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        setup_at_path(&config_path, &[])?;

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path)?;
        assert!(content.contains("# Example configuration file for cbrfx"));
        assert!(content.contains("feed:"));
        assert!(content.contains("currencies:"));

        Ok(())
    }

    #[test]
    fn test_setup_with_ids_lists_them() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        let ids = vec!["R01035".to_string(), "R01820".to_string()];

        setup_at_path(&config_path, &ids)?;

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.currencies, ids);
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.output.json_indent, 4);

        Ok(())
    }

    #[test]
    fn test_setup_fails_if_config_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "test")?;

        let result = setup_at_path(&config_path, &["R01235".to_string()]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
        // Existing file is left alone
        assert_eq!(fs::read_to_string(&config_path)?, "test");

        Ok(())
    }

    #[test]
    fn test_example_config_is_valid_yaml() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(&example_config(&[])?)
            .context("Failed to parse example config as YAML")?;

        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.feed.on_rate_limit, RateLimitPolicy::Cached);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.currencies, vec!["R01235", "R01239", "R01375"]);

        Ok(())
    }
}
