//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration is encapsulated so callers only see typed methods.
//! - Label values are constrained by the call sites (routes, action slugs).

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    bulk_actions_total: IntCounterVec,
    image_uploads_total: IntCounterVec,
    items_total: IntGauge,
}

/// Outcome label recorded for bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcomeLabel {
    /// The action applied to at least one item.
    Applied,
    /// The request was malformed or referenced unknown labels.
    Rejected,
    /// None of the selected items were owned by the caller.
    NoMatch,
    /// Storage failed.
    Failed,
}

impl BulkOutcomeLabel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Rejected => "rejected",
            Self::NoMatch => "no_match",
            Self::Failed => "failed",
        }
    }
}

/// Snapshot of selected gauges for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Items currently tracked across all owners.
    pub items_total: i64,
}

fn collector_err(name: &'static str) -> impl FnOnce(prometheus::Error) -> TelemetryError {
    move |source| TelemetryError::MetricsRegister { name, source }
}

fn register<C>(registry: &Registry, name: &'static str, collector: C) -> Result<C>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })?;
    Ok(collector)
}

impl Metrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any collector cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )
        .map_err(collector_err("http_requests_total"))?;
        let bulk_actions_total = IntCounterVec::new(
            Opts::new("bulk_actions_total", "Bulk actions handled by kind and outcome"),
            &["kind", "outcome"],
        )
        .map_err(collector_err("bulk_actions_total"))?;
        let image_uploads_total = IntCounterVec::new(
            Opts::new("image_uploads_total", "Main image uploads by outcome"),
            &["outcome"],
        )
        .map_err(collector_err("image_uploads_total"))?;
        let items_total = IntGauge::with_opts(Opts::new(
            "items_total",
            "Items currently tracked across all owners",
        ))
        .map_err(collector_err("items_total"))?;

        let http_requests_total = register(&registry, "http_requests_total", http_requests_total)?;
        let bulk_actions_total = register(&registry, "bulk_actions_total", bulk_actions_total)?;
        let image_uploads_total =
            register(&registry, "image_uploads_total", image_uploads_total)?;
        let items_total = register(&registry, "items_total", items_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                bulk_actions_total,
                image_uploads_total,
                items_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        let code = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[route, code.as_str()])
            .inc();
    }

    /// Record a handled bulk action.
    pub fn inc_bulk_action(&self, kind: &str, outcome: BulkOutcomeLabel) {
        self.inner
            .bulk_actions_total
            .with_label_values(&[kind, outcome.as_str()])
            .inc();
    }

    /// Record an image upload attempt.
    pub fn inc_image_upload(&self, succeeded: bool) {
        let outcome = if succeeded { "stored" } else { "failed" };
        self.inner
            .image_uploads_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Adjust the tracked item gauge by `delta`.
    pub fn adjust_items(&self, delta: i64) {
        self.inner.items_total.add(delta);
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or produces invalid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Point-in-time snapshot of the gauges.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_total: self.inner.items_total.get(),
        }
    }
}
