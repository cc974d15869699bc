// ABOUTME: Configuration types and parsing for regbridge.yml.
// ABOUTME: Handles YAML parsing, discovery, and the REGBRIDGE_CONFIG override.

mod init;
mod resolver;
mod workers;

pub use init::{TEMPLATE, init_config};
pub use resolver::ResolverConfig;
pub use workers::WorkerConfig;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "regbridge.yml";
pub const CONFIG_FILENAME_ALT: &str = "regbridge.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".regbridge/config.yml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "REGBRIDGE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub workers: WorkerConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find the config for `dir`.
    ///
    /// `REGBRIDGE_CONFIG` wins if set. Otherwise the usual filenames are tried
    /// in order, falling back to defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(&PathBuf::from(path));
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        tracing::debug!("No config file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.resolver.timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "resolver.timeout must be greater than zero".to_string(),
            ));
        }
        if self.workers.thread_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "workers.thread_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
