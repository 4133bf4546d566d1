use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, search, trending, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Search
        .route("/search", get(search::get_search_state))
        .route("/search/query", put(search::set_query))
        .route("/search/retry", post(search::retry))
        // Trending
        .route("/trending", get(trending::get_trending))
        .route("/trending/refresh", post(trending::refresh))
        // Live snapshots
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
