//! Item listing and CRUD handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path as AxumPath, RawQuery, State},
    http::StatusCode,
};
use shelf_api_models::{
    CreateItemRequest, ItemDetail, ItemListQuery, ItemListResponse, ItemSummary,
    UpdateItemRequest,
};
use shelf_core::CoreResult;
use tracing::info;
use uuid::Uuid;

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::errors::ApiError;

/// Load one page of the caller's working set as list rows.
pub(crate) async fn query_page(
    state: &ApiState,
    user_id: Uuid,
    query: &ItemListQuery,
) -> CoreResult<(Vec<ItemSummary>, u64)> {
    let page = state.repo.list_items(user_id, &query.to_core()).await?;
    let items = page.items.into_iter().map(ItemSummary::from).collect();
    Ok((items, page.total_items))
}

pub(crate) async fn list_items(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ItemListResponse>, ApiError> {
    let query = ItemListQuery::from_search_params(raw.as_deref().unwrap_or_default());
    let (items, total) = query_page(&state, user.user_id, &query)
        .await
        .map_err(|err| ApiError::from_core("list items", err))?;
    Ok(Json(ItemListResponse::new(
        items,
        total,
        query.page,
        query.per_page.get(),
    )))
}

pub(crate) async fn create_item(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemSummary>), ApiError> {
    let new_item = request.to_new_item();
    if new_item.title.is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    let record = state
        .repo
        .create_item(user.user_id, new_item)
        .await
        .map_err(|err| ApiError::from_core("create item", err))?;
    state.telemetry.adjust_items(1);
    info!(item_id = %record.item.id, "item created");
    Ok((StatusCode::CREATED, Json(ItemSummary::from(record))))
}

pub(crate) async fn get_item(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<Json<ItemDetail>, ApiError> {
    let detail = state
        .repo
        .get_item(user.user_id, id)
        .await
        .map_err(|err| ApiError::from_core("load item", err))?;
    Ok(Json(ItemDetail::from(detail)))
}

pub(crate) async fn update_item(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(id): AxumPath<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ItemSummary>, ApiError> {
    let patch = request.to_patch();
    if patch.is_empty() {
        return Err(ApiError::bad_request("no changes supplied"));
    }
    let record = state
        .repo
        .update_item(user.user_id, id, patch)
        .await
        .map_err(|err| ApiError::from_core("update item", err))?;
    info!(item_id = %id, "item updated");
    Ok(Json(ItemSummary::from(record)))
}

pub(crate) async fn delete_item(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .repo
        .delete_item(user.user_id, id)
        .await
        .map_err(|err| ApiError::from_core("delete item", err))?;
    if removed == 0 {
        return Err(ApiError::not_found("item not found"));
    }
    state
        .telemetry
        .adjust_items(-i64::try_from(removed).unwrap_or(i64::MAX));
    info!(item_id = %id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
