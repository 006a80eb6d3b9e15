//! Label handlers shared by categories, tags, locations, and team members.
//!
//! The same three handlers serve every label collection; the router attaches
//! the [`LabelKind`] as an extension per collection.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path as AxumPath, State},
    http::StatusCode,
};
use shelf_api_models::{CreateLabelRequest, LabelView};
use shelf_core::LabelKind;
use tracing::info;
use uuid::Uuid;

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::errors::ApiError;

/// Collection path segment for each label kind.
pub(crate) const fn collection(kind: LabelKind) -> &'static str {
    match kind {
        LabelKind::Category => "categories",
        LabelKind::Tag => "tags",
        LabelKind::Location => "locations",
        LabelKind::TeamMember => "team-members",
    }
}

pub(crate) const LABEL_KINDS: [LabelKind; 4] = [
    LabelKind::Category,
    LabelKind::Tag,
    LabelKind::Location,
    LabelKind::TeamMember,
];

pub(crate) async fn list_labels(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<LabelKind>,
) -> Result<Json<Vec<LabelView>>, ApiError> {
    let labels = state
        .repo
        .list_labels(user.user_id, kind)
        .await
        .map_err(|err| ApiError::from_core("list labels", err))?;
    Ok(Json(labels.into_iter().map(LabelView::from).collect()))
}

pub(crate) async fn create_label(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<LabelKind>,
    Json(request): Json<CreateLabelRequest>,
) -> Result<(StatusCode, Json<LabelView>), ApiError> {
    let label = state
        .repo
        .create_label(user.user_id, request.to_new_label(kind))
        .await
        .map_err(|err| ApiError::from_core("create label", err))?;
    info!(label_id = %label.id, kind = kind.as_str(), "label created");
    Ok((StatusCode::CREATED, Json(LabelView::from(label))))
}

pub(crate) async fn delete_label(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<LabelKind>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .repo
        .delete_label(user.user_id, kind, id)
        .await
        .map_err(|err| ApiError::from_core("delete label", err))?;
    if removed == 0 {
        return Err(ApiError::not_found("label not found"));
    }
    info!(label_id = %id, kind = kind.as_str(), "label deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::test_support;
    use anyhow::Result;
    use shelf_test_support::fixtures::id;

    #[tokio::test]
    async fn labels_are_scoped_by_kind() -> Result<()> {
        let (state, _repo) = test_support::state()?;
        let user = Extension(UserContext { user_id: id(1) });

        let (_, Json(depot)) = create_label(
            State(state.clone()),
            user,
            Extension(LabelKind::Location),
            Json(CreateLabelRequest {
                name: " Depot ".into(),
                color: None,
            }),
        )
        .await
        .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert_eq!(depot.name, "Depot");

        let Json(tags) = list_labels(State(state.clone()), user, Extension(LabelKind::Tag))
            .await
            .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert!(tags.is_empty());

        let wrong_kind = delete_label(
            State(state.clone()),
            user,
            Extension(LabelKind::Tag),
            AxumPath(depot.id),
        )
        .await;
        assert!(matches!(wrong_kind, Err(ref err) if err.status == StatusCode::NOT_FOUND));

        let status = delete_label(
            State(state),
            user,
            Extension(LabelKind::Location),
            AxumPath(depot.id),
        )
        .await
        .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert_eq!(status, StatusCode::NO_CONTENT);
        Ok(())
    }

    #[test]
    fn collections_are_distinct() {
        let names: std::collections::HashSet<_> = LABEL_KINDS.into_iter().map(collection).collect();
        assert_eq!(names.len(), LABEL_KINDS.len());
    }
}
