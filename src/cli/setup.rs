use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Annotated config with every key at its default value.
pub const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example config to the platform config directory.
pub fn setup() -> Result<()> {
    setup_at_path(AppConfig::default_config_path()?)
}

/// Writes the example config to `path`. Never overwrites an existing file.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_config_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");

        setup_at_path(&config_path)?;

        let content = fs::read_to_string(&config_path)?;
        assert!(content.contains("providers:"));
        assert!(content.contains("poll_interval_ms:"));
        assert!(content.contains("# Example configuration file for coinwatch"));

        Ok(())
    }

    #[test]
    fn test_setup_fails_if_config_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "poll_interval_ms: 1")?;

        let result = setup_at_path(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
        // Existing file is untouched
        assert_eq!(fs::read_to_string(&config_path)?, "poll_interval_ms: 1");

        Ok(())
    }

    #[test]
    fn test_setup_creates_parent_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("dir").join("config.yaml");

        setup_at_path(&config_path)?;
        AppConfig::load_from_path(&config_path)?;

        Ok(())
    }

    #[test]
    fn test_example_config_is_valid_yaml() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_CONFIG)
            .context("Failed to parse example config as YAML")?;

        let defaults = AppConfig::default();
        assert_eq!(
            config.providers.coingecko.base_url,
            defaults.providers.coingecko.base_url
        );
        assert_eq!(
            config.providers.cryptocompare.base_url,
            defaults.providers.cryptocompare.base_url
        );
        assert_eq!(config.poll_interval_ms, defaults.poll_interval_ms);
        assert_eq!(config.cache_ttl_secs, defaults.cache_ttl_secs);
        assert_eq!(config.max_currencies, defaults.max_currencies);
        assert_eq!(config.search_debounce_ms, defaults.search_debounce_ms);
        assert_eq!(config.series_capacity, defaults.series_capacity);

        Ok(())
    }
}
