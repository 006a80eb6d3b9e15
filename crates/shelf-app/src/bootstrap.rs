use std::future::Future;
use std::sync::Arc;

use shelf_api::{ApiServer, ApiSettings, ApiState};
use shelf_config::{LogFormatSetting, ShelfConfig};
use shelf_core::{ImageStore, ItemRepository};
use shelf_store::{MemoryImageStore, MemoryRepository};
use shelf_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Dependencies required to bootstrap the server.
pub(crate) struct BootstrapDependencies {
    config: ShelfConfig,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment.
    pub(crate) fn from_env() -> AppResult<Self> {
        let config =
            ShelfConfig::from_env().map_err(|err| AppError::config("config.from_env", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
        Ok(Self { config, telemetry })
    }
}

/// Entry point for the boot sequence; serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the listener fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies, shutdown_signal()).await
}

pub(crate) async fn run_app_with<F>(dependencies: BootstrapDependencies, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let BootstrapDependencies { config, telemetry } = dependencies;
    shelf_telemetry::init_logging(&logging_config(&config))
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("shelf");
    info!(config = ?config, "shelf bootstrap starting");

    let state = build_state(&config, telemetry)?;
    let api = ApiServer::new(state);
    api.serve(config.bind_addr, shutdown)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;
    info!("API server shutdown complete");
    Ok(())
}

/// Assemble handler state backed by the in-memory stores.
///
/// # Errors
///
/// Returns an error if the image store rejects the signing secret.
pub fn build_state(config: &ShelfConfig, telemetry: Metrics) -> AppResult<Arc<ApiState>> {
    let repo: Arc<dyn ItemRepository> = Arc::new(MemoryRepository::new());
    let images: Arc<dyn ImageStore> = Arc::new(
        MemoryImageStore::new(config.public_base(), &config.storage_secret)
            .map_err(|err| AppError::storage("image_store.new", err))?,
    );
    Ok(Arc::new(ApiState::new(
        repo,
        images,
        telemetry,
        ApiSettings::from_config(config),
    )))
}

fn logging_config(config: &ShelfConfig) -> LoggingConfig<'_> {
    let format = match config.log_format {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    };
    LoggingConfig {
        level: &config.log_level,
        format,
        ..LoggingConfig::default()
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> anyhow::Result<ShelfConfig> {
        Ok(ShelfConfig::from_lookup(|name| match name {
            "SHELF_STORAGE_SECRET" => Some("0123456789abcdef".to_string()),
            "SHELF_LOG_FORMAT" => Some("json".to_string()),
            "SHELF_IMAGE_URL_TTL_SECS" => Some("120".to_string()),
            _ => None,
        })?)
    }

    #[test]
    fn logging_follows_configuration() -> anyhow::Result<()> {
        let config = config()?;
        let logging = logging_config(&config);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "info");
        Ok(())
    }

    #[test]
    fn state_carries_configured_settings() -> anyhow::Result<()> {
        let config = config()?;
        let state = build_state(&config, Metrics::new()?)?;
        assert_eq!(state.settings().image_url_ttl, Duration::from_secs(120));
        assert_eq!(state.telemetry().snapshot().items_total, 0);
        Ok(())
    }
}
