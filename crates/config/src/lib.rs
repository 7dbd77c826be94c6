//! Configuration management for the retrieval engine
//!
//! Supports loading configuration from:
//! - TOML/YAML files (`config/default.*`)
//! - Environment variables (`POWERSYNC__` prefix, `__` separator)
//! - Runtime overrides
//!
//! Every tunable the engine reads is an explicit field on [`Settings`],
//! validated once at startup rather than consulted ad hoc per call.

pub mod settings;

pub use settings::{load_settings, IndexConfig, RetrievalConfig, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for powersync_core::Error {
    fn from(err: ConfigError) -> Self {
        powersync_core::Error::Config(err.to_string())
    }
}
