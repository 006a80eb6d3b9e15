//! Note handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path as AxumPath, State},
    http::StatusCode,
};
use shelf_api_models::{CreateNoteRequest, NoteView};
use shelf_core::NewNote;
use tracing::info;
use uuid::Uuid;

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::errors::ApiError;

pub(crate) async fn create_note(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(item_id): AxumPath<Uuid>,
    Json(request): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteView>), ApiError> {
    let note = state
        .repo
        .create_note(
            user.user_id,
            NewNote {
                item_id,
                content: request.content,
            },
        )
        .await
        .map_err(|err| ApiError::from_core("create note", err))?;
    info!(item_id = %item_id, note_id = %note.id, "note created");
    Ok((StatusCode::CREATED, Json(NoteView::from(note))))
}

pub(crate) async fn delete_note(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath((item_id, note_id)): AxumPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .repo
        .delete_note(user.user_id, note_id)
        .await
        .map_err(|err| ApiError::from_core("delete note", err))?;
    if removed == 0 {
        return Err(ApiError::not_found("note not found"));
    }
    info!(item_id = %item_id, note_id = %note_id, "note deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::test_support;
    use anyhow::Result;
    use shelf_test_support::fixtures::{id, seed_items};

    #[tokio::test]
    async fn notes_require_an_owned_item() -> Result<()> {
        let (state, repo) = test_support::state()?;
        let item_id = seed_items(&repo, id(1), 1).await?[0].item.id;
        let owner = Extension(UserContext { user_id: id(1) });
        let stranger = Extension(UserContext { user_id: id(2) });

        let denied = create_note(
            State(state.clone()),
            stranger,
            AxumPath(item_id),
            Json(CreateNoteRequest {
                content: "hello".into(),
            }),
        )
        .await;
        assert!(matches!(denied, Err(ref err) if err.status == StatusCode::NOT_FOUND));

        let (status, Json(note)) = create_note(
            State(state.clone()),
            owner,
            AxumPath(item_id),
            Json(CreateNoteRequest {
                content: "Checked **ok**".into(),
            }),
        )
        .await
        .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert_eq!(status, StatusCode::CREATED);

        let gone = delete_note(State(state.clone()), stranger, AxumPath((item_id, note.id))).await;
        assert!(matches!(gone, Err(ref err) if err.status == StatusCode::NOT_FOUND));
        let status = delete_note(State(state), owner, AxumPath((item_id, note.id)))
            .await
            .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert_eq!(status, StatusCode::NO_CONTENT);
        Ok(())
    }
}
