use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    config::{Config, PageLimits},
    db::CatalogStore,
    middleware::{make_span_with_request_id, request_id_middleware, timeout_middleware},
    services::{recommendations::DEFAULT_WEIGHTS, RecommendationEngine},
};

pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub engine: RecommendationEngine,
    pub page_limits: PageLimits,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, config: &Config) -> Self {
        Self {
            store,
            engine: RecommendationEngine::new(config.retrieval_policy(), DEFAULT_WEIGHTS),
            page_limits: config.page_limits(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(middleware::from_fn_with_state(
                    request_timeout,
                    timeout_middleware,
                )),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommendations", get(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
