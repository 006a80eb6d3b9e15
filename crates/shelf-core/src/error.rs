//! Error types for asset repository and image storage operations.

use thiserror::Error;
use uuid::Uuid;

/// Primary error type for domain operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity was not found or is not owned by the caller.
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind (`item`, `note`, `label`, `image`).
        entity: &'static str,
        /// Identifier that was looked up, when the lookup was by id.
        id: Option<Uuid>,
    },
    /// Input failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field name.
        field: &'static str,
        /// Static explanation of the failure.
        reason: &'static str,
    },
    /// A referenced label does not exist, is not owned, or has the wrong kind.
    #[error("{field} references an unknown label")]
    InvalidReference {
        /// Field carrying the reference.
        field: &'static str,
        /// Referenced identifier.
        id: Uuid,
    },
    /// A signed storage URL was rejected.
    #[error("signed url rejected: {reason}")]
    UrlRejected {
        /// Static explanation (expired, bad signature).
        reason: &'static str,
    },
    /// Backend storage failure.
    #[error("storage operation failed")]
    Storage {
        /// Operation identifier.
        operation: &'static str,
        /// Backend detail for logs.
        detail: String,
    },
}

impl CoreError {
    /// Shorthand for a missing entity looked up by identifier.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound {
            entity,
            id: Some(id),
        }
    }
}

/// Convenience alias for domain operation results.
pub type CoreResult<T> = Result<T, CoreError>;
