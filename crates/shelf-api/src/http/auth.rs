//! Caller identification middleware.
//!
//! Sessions are terminated upstream; the trusted proxy forwards the user id
//! in a header and this layer turns it into a [`UserContext`] extension.

use axum::{http::Request, middleware::Next, response::Response};
use tracing::debug;
use uuid::Uuid;

use crate::http::constants::HEADER_USER_ID;
use crate::http::errors::ApiError;

/// Authenticated caller attached to every `/v1` and `/api` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UserContext {
    pub(crate) user_id: Uuid,
}

pub(crate) async fn require_user(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = extract_user_id(&req)?;
    debug!(user_id = %user_id, "caller identified");
    req.extensions_mut().insert(UserContext { user_id });
    Ok(next.run(req).await)
}

fn extract_user_id<B>(req: &Request<B>) -> Result<Uuid, ApiError> {
    let raw = req
        .headers()
        .get(HEADER_USER_ID)
        .ok_or_else(|| ApiError::unauthorized("missing user header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("user header must be valid UTF-8"))?;
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::unauthorized("user header must be a UUID"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(value: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/v1/items");
        if let Some(value) = value {
            builder = builder.header(HEADER_USER_ID, value);
        }
        builder.body(()).unwrap_or_default()
    }

    #[test]
    fn user_header_must_be_a_uuid() {
        let id = Uuid::from_u128(7);
        assert_eq!(extract_user_id(&request(Some(&id.to_string()))).ok(), Some(id));

        for value in [None, Some("not-a-uuid"), Some("")] {
            let err = extract_user_id(&request(value)).err();
            assert_eq!(err.map(|e| e.status), Some(StatusCode::UNAUTHORIZED));
        }
    }
}
