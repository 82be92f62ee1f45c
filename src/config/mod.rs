//! Configuration loading and management.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter pipeline configuration.
    pub filters: FiltersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filters: FiltersConfig::default(),
        }
    }
}

/// Configuration of the mutation filter pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Filter keys to run, in order.
    pub enabled: Vec<String>,
    /// Emit a trace event per matcher step. Very verbose.
    pub trace: bool,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            enabled: vec![
                "avoid-loop-counter".to_string(),
                "infinite-for-loop".to_string(),
                "infinite-iterator-loop".to_string(),
            ],
            trace: false,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Env vars with `AUGUR_` prefix
    /// override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("AUGUR_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from a directory, looking for augur.toml.
    ///
    /// Missing files are silently skipped (defaults are used). Env vars
    /// with `AUGUR_` prefix override file and default values.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("augur.toml")))
            .merge(Toml::file(dir.join(".augur/augur.toml")))
            .merge(Env::prefixed("AUGUR_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        Ok(config)
    }
}
