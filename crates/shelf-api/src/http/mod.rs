//! HTTP surface modules (router, middleware, handlers).

/// Caller identification middleware.
pub mod auth;
/// Bulk action endpoints.
pub mod bulk;
/// Shared constants and header names for HTTP surfaces.
pub mod constants;
/// Dashboard aggregates.
pub mod dashboard;
/// Problem response helpers and error types.
pub mod errors;
/// Health and metrics endpoints.
pub mod health;
/// Main image upload and signed download.
pub mod images;
/// Item CRUD and listing.
pub mod items;
/// Category, tag, location, and team member endpoints.
pub mod labels;
/// Note endpoints.
pub mod notes;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
