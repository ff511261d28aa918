//! Error handling for configuration loading.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration value is present but not acceptable.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns whether this error was caused by the operator's input rather
    /// than the environment.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }
}
