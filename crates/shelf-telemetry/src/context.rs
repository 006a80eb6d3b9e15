//! Process span and per-request id scoping.
//!
//! Handlers log the id of the request they serve through
//! [`current_request_id`]; the HTTP layer opens the scope with
//! [`scope_request_id`].

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Keeps the process-wide `app` span entered while alive.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application span tagged with `service` and the build SHA.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service = service.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", service = %service, build_sha = %build_sha()),
        ));
        Self {
            _guard: span.enter(),
        }
    }
}

tokio::task_local! {
    static REQUEST_ID: Arc<str>;
}

/// Run `fut` with `request_id` visible to everything it awaits.
///
/// An empty id leaves the scope unset.
pub async fn scope_request_id<Fut, T>(request_id: &str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    if request_id.is_empty() {
        return fut.await;
    }
    REQUEST_ID.scope(Arc::from(request_id), fut).await
}

/// Id of the request being served, or `"-"` outside a request.
#[must_use]
pub fn current_request_id() -> Arc<str> {
    REQUEST_ID
        .try_with(Arc::clone)
        .unwrap_or_else(|_| Arc::from("-"))
}
