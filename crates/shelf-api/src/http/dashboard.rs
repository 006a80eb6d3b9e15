//! Dashboard aggregates.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use chrono::Utc;
use shelf_api_models::DashboardResponse;

use crate::app::state::ApiState;
use crate::http::auth::UserContext;
use crate::http::errors::ApiError;

pub(crate) async fn dashboard(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let data = state
        .repo
        .dashboard(user.user_id, Utc::now())
        .await
        .map_err(|err| ApiError::from_core("load dashboard", err))?;
    Ok(Json(DashboardResponse::from(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::test_support;
    use anyhow::Result;
    use shelf_test_support::fixtures::{id, seed_items};

    #[tokio::test]
    async fn dashboard_covers_twelve_months() -> Result<()> {
        let (state, repo) = test_support::state()?;
        seed_items(&repo, id(1), 7).await?;
        let Json(response) = dashboard(State(state), Extension(UserContext { user_id: id(1) }))
            .await
            .map_err(|err| anyhow::anyhow!("{err:?}"))?;
        assert_eq!(response.newest_items.len(), 5);
        assert_eq!(response.created_per_month.len(), 12);
        assert_eq!(response.created_per_month.last().map(|m| m.count), Some(7));
        assert_eq!(response.total_items, 7);
        Ok(())
    }
}
