//! Error types for housekeeping setup
//!
//! A running cycle never fails; these errors come from loading and validating
//! configuration and from the worker's runtime.

use thiserror::Error;

/// Errors that can occur while configuring or driving the housekeeper
#[derive(Error, Debug)]
pub enum HousekeeperError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}
