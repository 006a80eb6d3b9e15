#![forbid(unsafe_code)]
#![warn(unused, missing_docs, clippy::all, clippy::pedantic)]

//! Binary entrypoint that wires the Shelf services together and serves the API.

use shelf_app::{AppResult, run_app};

/// Bootstraps the Shelf server and blocks until shutdown.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}
