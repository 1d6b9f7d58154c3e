use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config::PageLimits,
    error::{AppError, AppResult},
    middleware::{AuthenticatedUser, RequestId},
    models::RecommendationResponse,
    routes::AppState,
    services::recommendations::PageRequest,
};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RecommendationQuery {
    /// Applies defaults, clamps `page` to 1 and bounds-checks `limit`
    pub fn into_page_request(self, limits: PageLimits) -> AppResult<PageRequest> {
        let page = u32::try_from(self.page.unwrap_or(1).max(1)).unwrap_or(u32::MAX);

        let limit = self.limit.unwrap_or(i64::from(limits.default_page_size));
        if limit < 1 || limit > i64::from(limits.max_page_size) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                limits.max_page_size
            )));
        }

        PageRequest::new(page, limit as u32)
    }
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(params) = query?;
    let request = params.into_page_request(state.page_limits)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        page = request.page(),
        limit = request.limit(),
        "Processing recommendation request"
    );

    let page = state
        .engine
        .get_recommendations(state.store.as_ref(), user_id, request)
        .await
        .inspect_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Recommendation request failed");
        })?;

    Ok(Json(RecommendationResponse::from(page)))
}
