#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Environment-driven runtime configuration.
//!
//! Layout: `defaults.rs` (fallback values), `model.rs` (typed settings),
//! `loader.rs` (parsing from the process environment or any lookup).

mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_BIND_ADDR, ENV_IMAGE_URL_TTL_SECS, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MAX_IMAGE_BYTES,
    ENV_PUBLIC_URL, ENV_STORAGE_SECRET,
};
pub use model::{LogFormatSetting, ShelfConfig};
