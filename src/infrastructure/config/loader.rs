use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Log levels accepted by the `logging.level` setting.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output formats accepted by the `logging.format` setting.
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Rejected configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("server.host must not be blank")]
    BlankHost,

    #[error("database.path must not be blank")]
    BlankDatabasePath,

    #[error("database.max_connections must be at least 1")]
    ZeroPoolSize,

    #[error("unknown log level {0:?}, expected one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("unknown log format {0:?}, expected json or pretty")]
    UnknownLogFormat(String),
}

/// Loads [`Config`] by merging defaults, YAML files, and environment
/// variables, then validates the result.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard hierarchy.
    ///
    /// Later sources override earlier ones: built-in defaults, then
    /// `.stride/config.yaml`, then `.stride/local.yaml`, then `STRIDE_*`
    /// environment variables. Nested keys use `__` in the environment,
    /// e.g. `STRIDE_SERVER__PORT=8080`.
    pub fn load() -> Result<Config> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".stride/config.yaml"))
            .merge(Yaml::file(".stride/local.yaml"))
            .merge(Env::prefixed("STRIDE_").split("__"));

        Self::resolve(figment)
    }

    /// Load configuration from one explicit file instead of the
    /// `.stride/` hierarchy. Environment variables still apply on top.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("STRIDE_").split("__"));

        Self::resolve(figment)
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    fn resolve(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .context("configuration could not be deserialized")?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.host.trim().is_empty() {
            return Err(ConfigError::BlankHost);
        }
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::BlankDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(config.logging.level.clone()));
        }
        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::UnknownLogFormat(config.logging.format.clone()));
        }
        Ok(())
    }
}
