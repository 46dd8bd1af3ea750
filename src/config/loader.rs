//! Configuration Loader
//!
//! Resolves the config file location, layers environment overrides on top and
//! validates the result before handing it to the dispatcher.

use ::config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::DispatchConfig;
use crate::constants::system;
use crate::error::Result;

/// Loaded configuration together with where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: DispatchConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load configuration from the default location with environment overrides
    ///
    /// The file path comes from `DISPATCH_CONFIG_PATH`, falling back to
    /// `config/dispatch.toml`. A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DISPATCH_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(system::DEFAULT_CONFIG_PATH));
        Self::load_from_path(path)
    }

    /// Load configuration from a specific file with environment overrides
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_sources(
            path.as_ref(),
            Environment::with_prefix(system::ENV_PREFIX).try_parsing(true),
        )
    }

    /// Load configuration from a file and an explicit environment source
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_sources(path: &Path, environment: Environment) -> Result<Self> {
        debug!(config_path = %path.display(), "Loading dispatch configuration");

        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()?;

        let config: DispatchConfig = settings.try_deserialize()?;
        config.validate()?;

        info!(
            config_path = %path.display(),
            tick_interval_ms = config.tick_interval_ms,
            history_capacity = config.history_capacity,
            handler_timeout_ms = config.handler_timeout_ms,
            "Dispatch configuration loaded"
        );

        Ok(Self {
            config,
            config_path: path.to_path_buf(),
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn into_config(self) -> DispatchConfig {
        self.config
    }
}
