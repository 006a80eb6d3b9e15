//! # Design
//!
//! - One error type for everything that can stop the server from starting.
//! - Messages stay constant; the operation and source carry the detail.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: shelf_config::ConfigError,
    },
    /// Telemetry could not be initialised.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: shelf_telemetry::TelemetryError,
    },
    /// A storage backend could not be constructed.
    #[error("storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Source domain error.
        source: shelf_core::CoreError,
    },
    /// The API server failed to bind or stopped unexpectedly.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: shelf_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: shelf_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: shelf_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn storage(operation: &'static str, source: shelf_core::CoreError) -> Self {
        Self::Storage { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: shelf_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn helpers_build_variants_and_keep_sources() {
        let config = AppError::config(
            "config.load",
            shelf_config::ConfigError::MissingEnv {
                name: "SHELF_STORAGE_SECRET",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));
        assert!(config.source().is_some());

        let api = AppError::api_server(
            "api_server.serve",
            shelf_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert_eq!(api.to_string(), "api server operation failed");

        let storage = AppError::storage(
            "image_store.new",
            shelf_core::CoreError::InvalidInput {
                field: "storage_secret",
                reason: "unusable as an hmac key",
            },
        );
        assert!(matches!(storage, AppError::Storage { .. }));
    }
}
