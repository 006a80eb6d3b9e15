//! Typed runtime settings.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Log output format requested through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormatSetting {
    /// Human-readable multi-line output.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Fully resolved runtime configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Tracing filter directive.
    pub log_level: String,
    /// Explicit log format; inferred from the build profile when absent.
    pub log_format: Option<LogFormatSetting>,
    /// Externally visible base URL used in signed links.
    pub public_url: Url,
    /// Secret used to sign storage URLs.
    pub storage_secret: Vec<u8>,
    /// Lifetime of signed image URLs.
    pub image_url_ttl: Duration,
    /// Upper bound on accepted image uploads.
    pub max_image_bytes: usize,
}

impl ShelfConfig {
    /// Public URL without a trailing slash.
    #[must_use]
    pub fn public_base(&self) -> &str {
        self.public_url.as_str().trim_end_matches('/')
    }
}

impl std::fmt::Debug for ShelfConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelfConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("public_url", &self.public_url.as_str())
            .field("storage_secret", &"<redacted>")
            .field("image_url_ttl", &self.image_url_ttl)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}
