//! Router construction and server host for the API.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    middleware,
    routing::{delete, get, post},
};
use shelf_telemetry::build_sha;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};

use crate::app::state::ApiState;
use crate::error::{ApiServerError, ApiServerResult};
use crate::http::auth::require_user;
use crate::http::bulk::bulk_action;
use crate::http::constants::{HEADER_REQUEST_ID, HEADER_USER_ID, MULTIPART_OVERHEAD_BYTES};
use crate::http::dashboard::dashboard;
use crate::http::health::{health, metrics};
use crate::http::images::{download_image, upload_main_image};
use crate::http::items::{create_item, delete_item, get_item, list_items, update_item};
use crate::http::labels::{LABEL_KINDS, collection, create_label, delete_label, list_labels};
use crate::http::notes::{create_note, delete_note};
use crate::http::telemetry::RequestTelemetryLayer;

/// Axum router wrapper that hosts the Shelf API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server around shared application state.
    #[must_use]
    pub fn new(state: Arc<ApiState>) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                CONTENT_TYPE,
                HeaderName::from_static(HEADER_USER_ID),
                HeaderName::from_static(HEADER_REQUEST_ID),
            ]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let route = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map_or_else(|| request.uri().path(), MatchedPath::as_str)
                    .to_string();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %route,
                    request_id = %request_id,
                    bulk_action = tracing::field::Empty,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(shelf_telemetry::propagate_request_id_layer())
            .layer(shelf_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(RequestTelemetryLayer::new(state.telemetry.clone()));

        let router = Self::public_routes()
            .merge(Self::user_routes(&state))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    fn public_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/storage/{*key}", get(download_image))
    }

    fn user_routes(state: &Arc<ApiState>) -> Router<Arc<ApiState>> {
        let upload_limit = state
            .settings
            .max_image_bytes
            .saturating_add(MULTIPART_OVERHEAD_BYTES);

        let mut router = Router::new()
            .route("/v1/items", get(list_items).post(create_item))
            .route(
                "/v1/items/{id}",
                get(get_item).patch(update_item).delete(delete_item),
            )
            .route("/v1/items/{id}/notes", post(create_note))
            .route("/v1/items/{id}/notes/{note_id}", delete(delete_note))
            .route(
                "/v1/items/{id}/main-image",
                post(upload_main_image).layer(DefaultBodyLimit::max(upload_limit)),
            )
            .route("/v1/dashboard", get(dashboard))
            .route("/api/assets/{action}", post(bulk_action));

        for kind in LABEL_KINDS {
            let base = format!("/v1/{}", collection(kind));
            router = router
                .route(
                    &base,
                    get(list_labels)
                        .post(create_label)
                        .layer(Extension(kind)),
                )
                .route(
                    &format!("{base}/{{id}}"),
                    delete(delete_label).layer(Extension(kind)),
                );
        }

        router.route_layer(middleware::from_fn(require_user))
    }

    /// Router with state applied, for in-process dispatch.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `addr` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(addr = %addr, "api listening");
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
