#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shelf application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (service wiring), `error.rs` (bootstrap errors).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Bootstrap error type.
pub mod error;

pub use bootstrap::{build_state, run_app};
pub use error::{AppError, AppResult};
