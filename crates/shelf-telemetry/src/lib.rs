#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Telemetry primitives shared across the Shelf workspace.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (application span and
//! task-local request id), `layers.rs` (request-id middleware),
//! `metrics.rs` (Prometheus registry), `error.rs` (error type).

pub mod context;
pub mod error;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{GlobalContextGuard, current_request_id, scope_request_id};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{BulkOutcomeLabel, Metrics, MetricsSnapshot};
