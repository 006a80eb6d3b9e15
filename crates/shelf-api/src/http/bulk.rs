//! Bulk action endpoints.
//!
//! # Design
//! - One route serves every kind; the kind is the path segment after the
//!   shared `bulk-update-` prefix.
//! - Bodies are form encoded with ids under `assetIds[i]`; errors use the
//!   `{ "error": { "message" } }` envelope so the dialog can show them inline.
//! - On success the caller's echoed list context is re-queried and returned
//!   as the authoritative page.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Path as AxumPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shelf_api_models::{
    BULK_ROUTE_PREFIX, BulkActionKind, BulkActionRequest, BulkActionResponse, BulkFormError,
    DEFAULT_ARRAY_FIELD, ErrorEnvelope, ItemListQuery,
};
use shelf_core::{BulkOperation, CoreError};
use shelf_telemetry::{BulkOutcomeLabel, current_request_id};
use tracing::{error, info, warn};

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::constants::{BULK_FAILED_MESSAGE, NO_MATCH_MESSAGE};
use crate::http::items::query_page;

/// Failure rendered as an error envelope.
#[derive(Debug)]
pub(crate) struct BulkError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl BulkError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for BulkError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorEnvelope::new(self.message))).into_response()
    }
}

fn form_message(err: &BulkFormError) -> String {
    match err {
        BulkFormError::EmptySelection => "Select at least one asset".to_string(),
        BulkFormError::MissingParam { field } => format!("Please provide {field}"),
        other => format!("Invalid request: {other}"),
    }
}

pub(crate) async fn bulk_action(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(action): AxumPath<String>,
    body: Bytes,
) -> Result<Json<BulkActionResponse>, BulkError> {
    let kind = action
        .strip_prefix(BULK_ROUTE_PREFIX)
        .and_then(BulkActionKind::from_slug)
        .ok_or_else(|| BulkError::new(StatusCode::NOT_FOUND, "Unknown bulk action"))?;
    let slug = kind.slug();
    let request_id = current_request_id();

    let pairs = url::form_urlencoded::parse(&body);
    let (request, operation) = BulkActionRequest::from_form_pairs(kind, DEFAULT_ARRAY_FIELD, pairs)
        .and_then(|request| request.to_operation().map(|op| (request, op)))
        .map_err(|err| {
            warn!(request_id = %request_id, kind = slug, error = %err, "bulk request rejected");
            state
                .telemetry
                .inc_bulk_action(slug, BulkOutcomeLabel::Rejected);
            BulkError::new(StatusCode::BAD_REQUEST, form_message(&err))
        })?;

    let affected = state
        .repo
        .bulk_update(user.user_id, &request.ids, operation.clone())
        .await
        .map_err(|err| {
            let (status, message, outcome) = match &err {
                CoreError::InvalidReference { field, .. } => (
                    StatusCode::BAD_REQUEST,
                    format!("{field} references an unknown label"),
                    BulkOutcomeLabel::Rejected,
                ),
                CoreError::InvalidInput { field, reason } => (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid {field}: {reason}"),
                    BulkOutcomeLabel::Rejected,
                ),
                _ => {
                    error!(
                        request_id = %request_id,
                        kind = slug,
                        error = %err,
                        "bulk update failed"
                    );
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        BULK_FAILED_MESSAGE.to_string(),
                        BulkOutcomeLabel::Failed,
                    )
                }
            };
            state.telemetry.inc_bulk_action(slug, outcome);
            BulkError::new(status, message)
        })?;

    if affected == 0 {
        state
            .telemetry
            .inc_bulk_action(slug, BulkOutcomeLabel::NoMatch);
        return Err(BulkError::new(StatusCode::NOT_FOUND, NO_MATCH_MESSAGE));
    }
    if operation == BulkOperation::Trash {
        state
            .telemetry
            .adjust_items(-i64::try_from(affected).unwrap_or(i64::MAX));
    }
    state
        .telemetry
        .inc_bulk_action(slug, BulkOutcomeLabel::Applied);
    info!(
        request_id = %request_id,
        kind = slug,
        requested = request.ids.len(),
        affected,
        "bulk action applied"
    );

    let query = ItemListQuery::from_search_params(&request.current_search_params);
    let (items, total) = query_page(&state, user.user_id, &query)
        .await
        .map_err(|err| {
            error!(
                request_id = %request_id,
                kind = slug,
                error = %err,
                "failed to reload items after bulk action"
            );
            BulkError::new(StatusCode::INTERNAL_SERVER_ERROR, BULK_FAILED_MESSAGE)
        })?;
    Ok(Json(BulkActionResponse::succeeded(items, total)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::test_support;
    use anyhow::Result;
    use shelf_api_models::{BulkActionParams, ItemStatus, Lifecycle};
    use shelf_core::LabelKind;
    use shelf_test_support::fixtures::{id, seed_items, seed_label};
    use uuid::Uuid;

    fn body(kind: BulkActionKind, ids: &[Uuid], params: BulkActionParams, search: &str) -> Bytes {
        let request = BulkActionRequest {
            kind,
            ids: ids.to_vec(),
            params,
            current_search_params: search.to_string(),
        };
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(request.to_form_pairs(DEFAULT_ARRAY_FIELD));
        Bytes::from(serializer.finish())
    }

    fn route(kind: BulkActionKind) -> AxumPath<String> {
        AxumPath(format!("{BULK_ROUTE_PREFIX}{}", kind.slug()))
    }

    #[tokio::test]
    async fn archive_returns_the_requeried_page() -> Result<()> {
        let (state, repo) = test_support::state()?;
        let seeded = seed_items(&repo, id(1), 5).await?;
        let targets: Vec<Uuid> = seeded.iter().take(2).map(|r| r.item.id).collect();

        let Json(response) = bulk_action(
            State(state.clone()),
            Extension(UserContext { user_id: id(1) }),
            route(BulkActionKind::Archive),
            body(
                BulkActionKind::Archive,
                &targets,
                BulkActionParams::default(),
                "page=1&per_page=20",
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!("{err:?}"))?;

        assert!(response.success);
        assert_eq!(response.total_items, Some(3));
        let remaining = response.items.unwrap_or_default();
        assert!(remaining.iter().all(|row| !targets.contains(&row.id)));
        assert!(remaining.iter().all(|row| row.lifecycle == Lifecycle::Active));
        Ok(())
    }

    #[tokio::test]
    async fn custody_requires_a_known_team_member() -> Result<()> {
        let (state, repo) = test_support::state()?;
        let seeded = seed_items(&repo, id(1), 2).await?;
        let targets: Vec<Uuid> = seeded.iter().map(|r| r.item.id).collect();
        let ctx = Extension(UserContext { user_id: id(1) });

        let missing = bulk_action(
            State(state.clone()),
            ctx,
            route(BulkActionKind::AssignCustody),
            body(
                BulkActionKind::AssignCustody,
                &targets,
                BulkActionParams::default(),
                "",
            ),
        )
        .await;
        assert!(matches!(missing, Err(ref err) if err.status == StatusCode::BAD_REQUEST));

        let unknown = bulk_action(
            State(state.clone()),
            ctx,
            route(BulkActionKind::AssignCustody),
            body(
                BulkActionKind::AssignCustody,
                &targets,
                BulkActionParams {
                    custodian_id: Some(id(99)),
                    ..BulkActionParams::default()
                },
                "",
            ),
        )
        .await;
        assert!(matches!(unknown, Err(ref err) if err.status == StatusCode::BAD_REQUEST));

        let member = seed_label(&repo, id(1), LabelKind::TeamMember, "Ana").await?;
        let Json(response) = bulk_action(
            State(state),
            ctx,
            route(BulkActionKind::AssignCustody),
            body(
                BulkActionKind::AssignCustody,
                &targets,
                BulkActionParams {
                    custodian_id: Some(member.id),
                    ..BulkActionParams::default()
                },
                "",
            ),
        )
        .await
        .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        let rows = response.items.unwrap_or_default();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.status == ItemStatus::InCustody));
        Ok(())
    }

    #[tokio::test]
    async fn foreign_selection_is_a_failure() -> Result<()> {
        let (state, repo) = test_support::state()?;
        let seeded = seed_items(&repo, id(1), 1).await?;
        let result = bulk_action(
            State(state),
            Extension(UserContext { user_id: id(2) }),
            route(BulkActionKind::Trash),
            body(
                BulkActionKind::Trash,
                &[seeded[0].item.id],
                BulkActionParams::default(),
                "",
            ),
        )
        .await;
        let err = result.err().map(|err| (err.status, err.message));
        assert_eq!(
            err,
            Some((StatusCode::NOT_FOUND, NO_MATCH_MESSAGE.to_string()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_actions_and_empty_selections_are_rejected() -> Result<()> {
        let (state, _repo) = test_support::state()?;
        let ctx = Extension(UserContext { user_id: id(1) });

        let unknown = bulk_action(
            State(state.clone()),
            ctx,
            AxumPath("bulk-update-explode".into()),
            Bytes::new(),
        )
        .await;
        assert!(matches!(unknown, Err(ref err) if err.status == StatusCode::NOT_FOUND));

        let empty = bulk_action(
            State(state),
            ctx,
            route(BulkActionKind::Activate),
            Bytes::from_static(b"currentSearchParams="),
        )
        .await;
        assert!(matches!(
            empty,
            Err(ref err) if err.status == StatusCode::BAD_REQUEST
                && err.message == "Select at least one asset"
        ));
        Ok(())
    }
}
