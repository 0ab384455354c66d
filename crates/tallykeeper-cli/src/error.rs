//! Error types for the simulator binary.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Housekeeper configuration or runtime error
    #[error(transparent)]
    Housekeeper(#[from] tallykeeper_housekeeper::HousekeeperError),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Logging setup failed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
