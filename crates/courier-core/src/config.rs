//! Configuration types for the catalog, routing, dispatch, and batch layers.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete router configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Catalog source configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Provider selection configuration.
    #[serde(default)]
    pub routing: RoutingOptions,
    /// Dispatch configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Batch coordination configuration.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Where the service catalog lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog JSON document.
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.json"),
        }
    }
}

/// Provider selection options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingOptions {
    /// Service id used when no category matches and as the fallback target.
    pub default_service: String,
    /// Language tag treated as the default; other tags trigger
    /// multilingual routing.
    pub default_language: String,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            default_service: "general".to_owned(),
            default_language: "en".to_owned(),
        }
    }
}

/// Dispatch options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Per-attempt deadline in milliseconds when neither the call nor the
    /// service descriptor overrides it.
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { timeout_ms: 60_000 }
    }
}

/// Batch coordination options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of in-flight provider calls.
    pub max_concurrent: usize,
    /// Optional whole-batch deadline in milliseconds.
    pub deadline_ms: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            deadline_ms: None,
        }
    }
}

impl RouterConfig {
    /// Returns the default config file path (`~/.courier/config.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("could not determine home directory".to_owned()))?;
        Ok(home.join(".courier").join("config.toml"))
    }

    /// Loads the config from the default path, creating it with defaults on
    /// first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default file cannot be written.
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// Loads the config from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Writes the config to a TOML file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|error| Error::Config(format!("failed to serialize config: {error}")))?;

        let header = "# Courier Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;

        Ok(())
    }

    /// Resolves a named environment variable to a secret value.
    ///
    /// Used by descriptors whose auth config names a token variable instead
    /// of embedding the token.
    pub fn env_secret(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.routing.default_service, "general");
        assert_eq!(config.routing.default_language, "en");
        assert_eq!(config.dispatch.timeout_ms, 60_000);
        assert_eq!(config.batch.max_concurrent, 4);
        assert!(config.batch.deadline_ms.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let temp = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("temp dir failed: {error}"),
        };
        let path = temp.path().join("config.toml");

        let mut config = RouterConfig::default();
        config.routing.default_service = "svc-default".to_owned();
        config.batch.deadline_ms = Some(30_000);

        match config.save_to_file(&path) {
            Ok(()) => {}
            Err(error) => panic!("save failed: {error}"),
        }
        let loaded = match RouterConfig::load_from_file(&path) {
            Ok(loaded) => loaded,
            Err(error) => panic!("load failed: {error}"),
        };

        assert_eq!(loaded.routing.default_service, "svc-default");
        assert_eq!(loaded.batch.deadline_ms, Some(30_000));
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let temp = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("temp dir failed: {error}"),
        };
        let path = temp.path().join("config.toml");
        match fs::write(&path, "not [valid toml") {
            Ok(()) => {}
            Err(error) => panic!("write failed: {error}"),
        }

        RouterConfig::load_from_file(&path).unwrap_err();
    }
}
