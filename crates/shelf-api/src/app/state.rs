//! API application state and tunables.

use std::sync::Arc;
use std::time::Duration;

use shelf_config::ShelfConfig;
use shelf_core::{ImageStore, ItemRepository};
use shelf_telemetry::Metrics;

/// Tunables the handlers read per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSettings {
    /// Lifetime of signed image URLs.
    pub image_url_ttl: Duration,
    /// Largest accepted image upload.
    pub max_image_bytes: usize,
}

impl ApiSettings {
    /// Derive settings from the loaded configuration.
    #[must_use]
    pub const fn from_config(config: &ShelfConfig) -> Self {
        Self {
            image_url_ttl: config.image_url_ttl,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            image_url_ttl: Duration::from_secs(86_400),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Dependencies handed to every handler through `State<Arc<ApiState>>`.
pub struct ApiState {
    pub(crate) repo: Arc<dyn ItemRepository>,
    pub(crate) images: Arc<dyn ImageStore>,
    pub(crate) telemetry: Metrics,
    pub(crate) settings: ApiSettings,
}

impl ApiState {
    /// Bundle the repository, image store, metrics, and settings.
    #[must_use]
    pub fn new(
        repo: Arc<dyn ItemRepository>,
        images: Arc<dyn ImageStore>,
        telemetry: Metrics,
        settings: ApiSettings,
    ) -> Self {
        Self {
            repo,
            images,
            telemetry,
            settings,
        }
    }

    /// Shared metrics handle.
    #[must_use]
    pub const fn telemetry(&self) -> &Metrics {
        &self.telemetry
    }

    /// Active tunables.
    #[must_use]
    pub const fn settings(&self) -> ApiSettings {
        self.settings
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use shelf_store::{MemoryImageStore, MemoryRepository};
    use shelf_test_support::fixtures::{TEST_PUBLIC_URL, TEST_SECRET};

    /// State over fresh in-memory stores, returning the repository for seeding.
    pub(crate) fn state() -> anyhow::Result<(Arc<ApiState>, Arc<MemoryRepository>)> {
        let repo = Arc::new(MemoryRepository::new());
        let images = Arc::new(MemoryImageStore::new(TEST_PUBLIC_URL, TEST_SECRET)?);
        let state = ApiState::new(
            repo.clone(),
            images,
            Metrics::new()?,
            ApiSettings::default(),
        );
        Ok((Arc::new(state), repo))
    }
}
