//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::EngineConfig,
};

/// Loads, validates and saves [`EngineConfig`]
///
/// Sources are layered in this order, later ones winning:
/// 1. built-in defaults
/// 2. the TOML file at `config_path` (optional)
/// 3. environment variables, e.g. `ROLLCALL__SCAN__DEBOUNCE_MS=750`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager reading the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "ROLLCALL".to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: "ROLLCALL".to_string(),
        }
    }

    /// Override the environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// File read by [`ConfigManager::load`]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rollcall")
            .join("config.toml")
    }

    /// Load and validate the layered configuration
    pub fn load(&self) -> Result<EngineConfig> {
        let config = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let engine: EngineConfig = config.try_deserialize()?;
        self.validate(&engine)?;
        debug!(path = %self.config_path.display(), "configuration loaded");
        Ok(engine)
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        self.validate(config)?;
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Reject settings the engine cannot run with, such as a zero poll period
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        if config.scan.focus_check_ms == 0 {
            return Err(ConfigError::Validation(
                "focus_check_ms must be greater than 0".to_string(),
            ));
        }
        if config.announcer.history_limit == 0 {
            return Err(ConfigError::Validation(
                "history_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
