//! Trending API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use cinescout_core::TrendingRanking;
use serde::Serialize;

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct TrendingEntryResponse {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub query: String,
    pub hit_count: u32,
    pub movie_id: u64,
    pub title: String,
    pub poster_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingResponse {
    pub entries: Vec<TrendingEntryResponse>,
}

impl TrendingResponse {
    pub fn from_ranking(ranking: &TrendingRanking, image_base_url: &str) -> Self {
        Self {
            entries: ranking
                .ranked()
                .map(|(rank, entry)| TrendingEntryResponse {
                    rank,
                    query: entry.query.clone(),
                    hit_count: entry.hit_count,
                    movie_id: entry.representative.id,
                    title: entry.representative.title.clone(),
                    poster_url: entry.representative.poster_url(image_base_url),
                })
                .collect(),
        }
    }
}

/// GET /api/v1/trending
///
/// Current trending snapshot. Empty until the first successful read.
pub async fn get_trending(State(state): State<Arc<AppState>>) -> Json<TrendingResponse> {
    let ranking = state.search().trending();
    Json(TrendingResponse::from_ranking(
        &ranking,
        state.image_base_url(),
    ))
}

/// POST /api/v1/trending/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<StatusCode, impl IntoResponse> {
    state
        .search()
        .refresh_trending()
        .map(|_| StatusCode::ACCEPTED)
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })
}
