//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable was not set.
    #[error("missing environment configuration")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable held an unusable value.
    #[error("invalid environment configuration")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value; omitted for secrets.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
