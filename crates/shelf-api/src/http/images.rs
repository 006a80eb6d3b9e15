//! Main image upload and signed image download.
//!
//! Uploads answer with the `{ "error": { "message" } }` envelope on failure so
//! the item form can show one generic message; ownership problems stay
//! problem documents.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Extension, Multipart, Path as AxumPath, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use shelf_api_models::{ErrorEnvelope, ImageUploadResponse};
use shelf_core::{ImageUpload, ItemPatch, main_image_key};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::constants::{MAIN_IMAGE_FIELD, UPLOAD_FAILED_MESSAGE};
use crate::http::errors::ApiError;

#[derive(Debug)]
pub(crate) enum UploadError {
    Problem(ApiError),
    Failed,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            Self::Problem(err) => err.into_response(),
            Self::Failed => (
                StatusCode::BAD_REQUEST,
                Json(ErrorEnvelope::new(UPLOAD_FAILED_MESSAGE)),
            )
                .into_response(),
        }
    }
}

async fn read_image(mut multipart: Multipart, max_bytes: usize) -> Option<ImageUpload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "malformed multipart body");
                return None;
            }
        };
        if field.name() != Some(MAIN_IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            warn!(content_type = %content_type, "upload is not an image");
            return None;
        }
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to read image field");
                return None;
            }
        };
        if bytes.is_empty() || bytes.len() > max_bytes {
            warn!(size = bytes.len(), max_bytes, "image size out of bounds");
            return None;
        }
        return Some(ImageUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

pub(crate) async fn upload_main_image(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(item_id): AxumPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<ImageUploadResponse>, UploadError> {
    state
        .repo
        .get_item(user.user_id, item_id)
        .await
        .map_err(|err| UploadError::Problem(ApiError::from_core("load item", err)))?;

    let result = store_main_image(&state, user.user_id, item_id, multipart).await;
    state.telemetry.inc_image_upload(result.is_ok());
    result.map(Json)
}

async fn store_main_image(
    state: &ApiState,
    user_id: Uuid,
    item_id: Uuid,
    multipart: Multipart,
) -> Result<ImageUploadResponse, UploadError> {
    let image = read_image(multipart, state.settings.max_image_bytes)
        .await
        .ok_or(UploadError::Failed)?;

    let now = Utc::now();
    let ttl = ChronoDuration::from_std(state.settings.image_url_ttl).map_err(|err| {
        error!(error = %err, "image url ttl out of range");
        UploadError::Failed
    })?;
    let key = main_image_key(user_id, item_id, now);
    state.images.put(&key, image).await.map_err(|err| {
        error!(error = %err, key = %key, "failed to store image");
        UploadError::Failed
    })?;

    let signed = state.images.sign(&key, now + ttl);
    state
        .repo
        .update_item(
            user_id,
            item_id,
            ItemPatch {
                main_image: Some(signed.url.clone()),
                main_image_expiration: Some(signed.expires_at),
                ..ItemPatch::default()
            },
        )
        .await
        .map_err(|err| {
            error!(error = %err, item_id = %item_id, "failed to record main image");
            UploadError::Failed
        })?;

    info!(item_id = %item_id, key = %key, "main image stored");
    Ok(ImageUploadResponse {
        url: signed.url,
        expires_at: signed.expires_at,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignedQuery {
    expires: i64,
    token: String,
}

pub(crate) async fn download_image(
    State(state): State<Arc<ApiState>>,
    AxumPath(key): AxumPath<String>,
    Query(signed): Query<SignedQuery>,
) -> Result<Response, ApiError> {
    state
        .images
        .verify(&key, signed.expires, &signed.token, Utc::now())
        .map_err(|err| ApiError::from_core("verify image url", err))?;
    let image = state
        .images
        .get(&key)
        .await
        .map_err(|err| ApiError::from_core("read image", err))?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(image.bytes))
        .map_err(|err| {
            error!(error = %err, "failed to build image response");
            ApiError::internal("failed to build image response")
        })
}
