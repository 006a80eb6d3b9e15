#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shelf HTTP API.
//!
//! Layout: `app/` (shared state), `http/` (router, middleware, handlers),
//! `error.rs` (server lifecycle errors).

pub mod app;
pub mod error;
pub mod http;

pub use app::state::{ApiSettings, ApiState};
pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
