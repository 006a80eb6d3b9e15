#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! Shelf client state core.
//!
//! Holds the item list state and the bulk selection/dialog/submission flow as
//! plain Rust values so every transition can be tested without a renderer.
//! Layout: `models.rs` (row snapshots), `features/bulk` (selection store,
//! header selector, dialog registry, submitter), `features/items` (list and
//! filter state), `services/api.rs` (HTTP client), `core/store.rs` (app store).

pub mod core;
pub mod features;
pub mod models;
pub mod services;
