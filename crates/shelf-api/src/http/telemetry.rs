//! Per-request telemetry: route counters, bulk kind tagging, and the
//! request id scope handlers log under.
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use axum::extract::MatchedPath;
use axum::http::Request;
use shelf_api_models::{BULK_ROUTE_PREFIX, BulkActionKind};
use shelf_telemetry::{Metrics, scope_request_id};
use tower::{Layer, Service};
use tracing::Span;

use crate::http::constants::{BULK_PATH_PREFIX, HEADER_REQUEST_ID};

const UNMATCHED_ROUTE: &str = "unmatched";

/// Bulk kind addressed by a request path, if it names one.
fn bulk_kind(path: &str) -> Option<BulkActionKind> {
    path.strip_prefix(BULK_PATH_PREFIX)?
        .strip_prefix(BULK_ROUTE_PREFIX)
        .and_then(BulkActionKind::from_slug)
}

/// Counts requests per route and status, splitting the bulk route by kind.
#[derive(Clone)]
pub(crate) struct RequestTelemetryLayer {
    metrics: Metrics,
}

impl RequestTelemetryLayer {
    pub(crate) const fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for RequestTelemetryLayer {
    type Service = RequestTelemetry<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTelemetry {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct RequestTelemetry<S> {
    inner: S,
    metrics: Metrics,
}

impl<S, B> Service<Request<B>> for RequestTelemetry<S>
where
    S: Service<Request<B>, Response = axum::response::Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        // Known bulk kinds get their own label; anything else under the
        // bulk route shares the matched pattern.
        let route = match bulk_kind(req.uri().path()) {
            Some(kind) => {
                Span::current().record("bulk_action", kind.slug());
                kind.endpoint()
            }
            None => req
                .extensions()
                .get::<MatchedPath>()
                .map_or_else(|| UNMATCHED_ROUTE.to_string(), |m| m.as_str().to_string()),
        };
        let request_id = req
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let metrics = self.metrics.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let response = scope_request_id(&request_id, fut).await?;
            metrics.inc_http_request(&route, response.status().as_u16());
            Ok(response)
        })
    }
}
