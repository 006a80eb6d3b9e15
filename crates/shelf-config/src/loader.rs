//! Parse [`ShelfConfig`] from environment variables.
//!
//! # Design
//! - Every knob except the storage secret has a default.
//! - Parsing goes through a lookup closure so tests never touch the process
//!   environment.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{LogFormatSetting, ShelfConfig};

/// Socket address for the HTTP server.
pub const ENV_BIND_ADDR: &str = "SHELF_BIND_ADDR";
/// Tracing filter directive.
pub const ENV_LOG_LEVEL: &str = "SHELF_LOG_LEVEL";
/// `pretty` or `json`.
pub const ENV_LOG_FORMAT: &str = "SHELF_LOG_FORMAT";
/// Externally visible base URL.
pub const ENV_PUBLIC_URL: &str = "SHELF_PUBLIC_URL";
/// Storage URL signing secret.
pub const ENV_STORAGE_SECRET: &str = "SHELF_STORAGE_SECRET";
/// Signed image URL lifetime in seconds.
pub const ENV_IMAGE_URL_TTL_SECS: &str = "SHELF_IMAGE_URL_TTL_SECS";
/// Maximum accepted image size in bytes.
pub const ENV_MAX_IMAGE_BYTES: &str = "SHELF_MAX_IMAGE_BYTES";

impl ShelfConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_raw = read(ENV_BIND_ADDR).unwrap_or_else(|| defaults::BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| invalid(ENV_BIND_ADDR, Some(bind_raw.clone()), "not a socket address"))?;

        let log_level = read(ENV_LOG_LEVEL).unwrap_or_else(|| defaults::LOG_LEVEL.to_string());

        let log_format = match read(ENV_LOG_FORMAT).as_deref() {
            None => None,
            Some("pretty") => Some(LogFormatSetting::Pretty),
            Some("json") => Some(LogFormatSetting::Json),
            Some(other) => {
                return Err(invalid(
                    ENV_LOG_FORMAT,
                    Some(other.to_string()),
                    "expected pretty or json",
                ));
            }
        };

        let url_raw = read(ENV_PUBLIC_URL).unwrap_or_else(|| defaults::PUBLIC_URL.to_string());
        let public_url = Url::parse(&url_raw)
            .map_err(|_| invalid(ENV_PUBLIC_URL, Some(url_raw.clone()), "not an absolute url"))?;
        if !matches!(public_url.scheme(), "http" | "https") {
            return Err(invalid(ENV_PUBLIC_URL, Some(url_raw), "scheme must be http or https"));
        }

        let storage_secret = read(ENV_STORAGE_SECRET)
            .ok_or(ConfigError::MissingEnv {
                name: ENV_STORAGE_SECRET,
            })?
            .into_bytes();
        if storage_secret.len() < defaults::MIN_SECRET_BYTES {
            return Err(invalid(ENV_STORAGE_SECRET, None, "shorter than 16 bytes"));
        }

        let ttl_secs = parse_positive(
            ENV_IMAGE_URL_TTL_SECS,
            read(ENV_IMAGE_URL_TTL_SECS),
            defaults::IMAGE_URL_TTL_SECS,
        )?;
        let max_image_bytes = parse_positive(
            ENV_MAX_IMAGE_BYTES,
            read(ENV_MAX_IMAGE_BYTES),
            defaults::MAX_IMAGE_BYTES as u64,
        )?;

        Ok(Self {
            bind_addr,
            log_level,
            log_format,
            public_url,
            storage_secret,
            image_url_ttl: Duration::from_secs(ttl_secs),
            max_image_bytes: usize::try_from(max_image_bytes).map_err(|_| {
                invalid(
                    ENV_MAX_IMAGE_BYTES,
                    Some(max_image_bytes.to_string()),
                    "exceeds addressable memory",
                )
            })?,
        })
    }
}

fn invalid(name: &'static str, value: Option<String>, reason: &'static str) -> ConfigError {
    ConfigError::InvalidEnv {
        name,
        value,
        reason,
    }
}

fn parse_positive(name: &'static str, raw: Option<String>, default: u64) -> ConfigResult<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(invalid(name, Some(raw), "must be greater than zero")),
        Ok(value) => Ok(value),
        Err(_) => Err(invalid(name, Some(raw), "not an unsigned integer")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const SECRET: (&str, &str) = (ENV_STORAGE_SECRET, "0123456789abcdef");

    #[test]
    fn defaults_apply_when_only_secret_is_set() -> ConfigResult<()> {
        let config = ShelfConfig::from_lookup(lookup(&[SECRET]))?;
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:7070");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, None);
        assert_eq!(config.public_base(), "http://127.0.0.1:7070");
        assert_eq!(config.image_url_ttl, Duration::from_secs(86_400));
        assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
        Ok(())
    }

    #[test]
    fn explicit_values_override_defaults() -> ConfigResult<()> {
        let config = ShelfConfig::from_lookup(lookup(&[
            SECRET,
            (ENV_BIND_ADDR, "0.0.0.0:9000"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_PUBLIC_URL, "https://assets.example.com/"),
            (ENV_IMAGE_URL_TTL_SECS, "60"),
        ]))?;
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_format, Some(LogFormatSetting::Json));
        assert_eq!(config.public_base(), "https://assets.example.com");
        assert_eq!(config.image_url_ttl, Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn secret_is_required_and_bounded() {
        assert_eq!(
            ShelfConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingEnv {
                name: ENV_STORAGE_SECRET
            })
        );
        assert!(matches!(
            ShelfConfig::from_lookup(lookup(&[(ENV_STORAGE_SECRET, "short")])),
            Err(ConfigError::InvalidEnv { value: None, .. })
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        for (name, value) in [
            (ENV_BIND_ADDR, "nowhere"),
            (ENV_LOG_FORMAT, "xml"),
            (ENV_PUBLIC_URL, "ftp://files"),
            (ENV_MAX_IMAGE_BYTES, "0"),
            (ENV_IMAGE_URL_TTL_SECS, "-5"),
        ] {
            let result = ShelfConfig::from_lookup(lookup(&[SECRET, (name, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnv { name: n, .. }) if n == name),
                "{name}={value} should be rejected"
            );
        }
    }

    #[test]
    fn debug_output_redacts_the_secret() -> ConfigResult<()> {
        let config = ShelfConfig::from_lookup(lookup(&[SECRET]))?;
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("0123456789abcdef"));
        Ok(())
    }
}
