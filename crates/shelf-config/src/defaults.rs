//! Fallback values applied when an environment variable is absent.

pub(crate) const BIND_ADDR: &str = "127.0.0.1:7070";
pub(crate) const LOG_LEVEL: &str = "info";
pub(crate) const PUBLIC_URL: &str = "http://127.0.0.1:7070";
/// One day.
pub(crate) const IMAGE_URL_TTL_SECS: u64 = 86_400;
/// 10 MiB.
pub(crate) const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub(crate) const MIN_SECRET_BYTES: usize = 16;
