//! HTTP client for the Shelf API.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use shelf_api_models::{
    BulkActionResponse, DashboardResponse, ErrorMessage, ItemListQuery, ItemListResponse,
    ProblemDetails,
};
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;
use uuid::Uuid;

use crate::core::logic::build_items_path;
use crate::features::bulk::submit::BulkTransport;

/// Header carrying the caller's identity.
pub const HEADER_USER_ID: &str = "x-shelf-user-id";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const UNREACHABLE_MESSAGE: &str = "Could not reach the server. Please try again.";
const UNEXPECTED_MESSAGE: &str = "Unexpected response from server";

/// Failures talking to the API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Base URL could not be parsed or joined.
    #[error("invalid api url")]
    Url {
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The request did not complete.
    #[error("request failed")]
    Request {
        /// Client failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a status and no usable body.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The body did not match the expected shape.
    #[error("response body could not be decoded")]
    Decode {
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// Message suitable for showing inline in a dialog.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Url { .. } | Self::Request { .. } => UNREACHABLE_MESSAGE.to_string(),
            Self::Status { status } => format!("{UNEXPECTED_MESSAGE} (status {status})"),
            Self::Decode { .. } => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

/// Thin REST client scoped to one user.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    user_id: Uuid,
    http: Client,
}

impl ApiClient {
    /// Client for the API at `base_url`, acting as `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Url`] when `base_url` is not absolute.
    pub fn new(base_url: &str, user_id: Uuid) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url).map_err(|source| TransportError::Url { source })?;
        Ok(Self {
            base_url,
            user_id,
            http: Client::new(),
        })
    }

    /// Replace the underlying HTTP client.
    #[must_use]
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|source| TransportError::Url { source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let response = self
            .http
            .get(self.url(path)?)
            .header(HEADER_USER_ID, self.user_id.to_string())
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request { source })?;
        serde_json::from_slice(&body).map_err(|source| TransportError::Decode { source })
    }

    /// Fetch one page of the item list.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network, status, or decode failures.
    pub async fn fetch_items(
        &self,
        query: &ItemListQuery,
    ) -> Result<ItemListResponse, TransportError> {
        self.get_json(&build_items_path(query)).await
    }

    /// Fetch the dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network, status, or decode failures.
    pub async fn fetch_dashboard(&self) -> Result<DashboardResponse, TransportError> {
        self.get_json("/v1/dashboard").await
    }

    /// POST a bulk form and interpret whatever body comes back.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request fails or the body is
    /// neither a bulk response nor a problem document.
    pub async fn post_bulk_form(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<BulkActionResponse, TransportError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let response = self
            .http
            .post(self.url(endpoint)?)
            .header(HEADER_USER_ID, self.user_id.to_string())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request { source })?;
        decode_bulk_body(status, &bytes)
    }
}

fn decode_bulk_body(status: StatusCode, body: &[u8]) -> Result<BulkActionResponse, TransportError> {
    if let Ok(parsed) = serde_json::from_slice::<BulkActionResponse>(body)
        && (parsed.success || parsed.error.is_some())
    {
        return Ok(parsed);
    }
    if let Ok(problem) = serde_json::from_slice::<ProblemDetails>(body) {
        debug!(status = problem.status, "bulk request answered with a problem document");
        return Ok(BulkActionResponse {
            error: Some(ErrorMessage {
                message: problem.detail.unwrap_or(problem.title),
            }),
            ..BulkActionResponse::default()
        });
    }
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }
    serde_json::from_slice(body).map_err(|source| TransportError::Decode { source })
}

#[async_trait]
impl BulkTransport for ApiClient {
    async fn post_bulk(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<BulkActionResponse, TransportError> {
        self.post_bulk_form(endpoint, form).await
    }

    async fn fetch_items(&self, query: &ItemListQuery) -> Result<ItemListResponse, TransportError> {
        Self::fetch_items(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_api_models::BulkOutcome;

    #[test]
    fn error_envelopes_decode_as_failures() {
        let body = br#"{"error":{"message":"Select at least one asset"}}"#;
        let parsed = decode_bulk_body(StatusCode::BAD_REQUEST, body);
        assert!(matches!(
            parsed.map(BulkActionResponse::outcome),
            Ok(BulkOutcome::Failure { message }) if message == "Select at least one asset"
        ));
    }

    #[test]
    fn problem_documents_surface_their_detail() {
        let body = br#"{"type":"https://shelf.dev/problems/unauthorized","title":"unauthorized","status":401,"detail":"missing user header"}"#;
        let parsed = decode_bulk_body(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(
            parsed.map(BulkActionResponse::outcome),
            Ok(BulkOutcome::Failure { message }) if message == "missing user header"
        ));
    }

    #[test]
    fn unreadable_error_bodies_report_the_status() {
        let parsed = decode_bulk_body(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(parsed, Err(TransportError::Status { status: 502 })));
        let parsed = decode_bulk_body(StatusCode::OK, b"not json");
        assert!(matches!(parsed, Err(TransportError::Decode { .. })));
    }

    #[test]
    fn user_messages_hide_transport_detail() {
        assert_eq!(
            TransportError::Status { status: 503 }.user_message(),
            "Unexpected response from server (status 503)"
        );
    }

    #[test]
    fn relative_base_urls_are_rejected() {
        assert!(matches!(
            ApiClient::new("/relative", Uuid::nil()),
            Err(TransportError::Url { .. })
        ));
    }
}
