//! Search API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use cinescout_core::{MovieSummary, SearchError, SearchPhase, SearchState};
use serde::{Deserialize, Serialize};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// A movie as shown in a result grid.
#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub poster_url: String,
    /// One decimal place, or "N/A".
    pub rating: String,
    /// Release year, or "N/A".
    pub year: String,
    pub language: String,
}

impl MovieCard {
    pub fn from_summary(movie: &MovieSummary, image_base_url: &str) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(image_base_url),
            rating: movie.rating_label(),
            year: movie.year_label(),
            language: movie.language_label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchStateResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_query: Option<String>,
    pub phase: SearchPhase,
    pub is_loading: bool,
    pub error: Option<String>,
    pub results: Vec<MovieCard>,
}

impl SearchStateResponse {
    pub fn from_state(state: &SearchState, image_base_url: &str) -> Self {
        Self {
            query: state.query().to_string(),
            settled_query: state.settled_query().map(str::to_string),
            phase: state.phase(),
            is_loading: state.is_loading(),
            error: state.error().map(str::to_string),
            results: state
                .results()
                .iter()
                .map(|m| MovieCard::from_summary(m, image_base_url))
                .collect(),
        }
    }
}

fn unavailable(e: SearchError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search
///
/// Current search snapshot.
pub async fn get_search_state(State(state): State<Arc<AppState>>) -> Json<SearchStateResponse> {
    let snapshot = state.search().state();
    Json(SearchStateResponse::from_state(
        &snapshot,
        state.image_base_url(),
    ))
}

/// PUT /api/v1/search/query
///
/// Raw query text changed. The search runs once the input settles.
pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequest>,
) -> Result<StatusCode, impl IntoResponse> {
    state
        .search()
        .set_query(body.query)
        .map(|_| StatusCode::ACCEPTED)
        .map_err(unavailable)
}

/// POST /api/v1/search/retry
pub async fn retry(State(state): State<Arc<AppState>>) -> Result<StatusCode, impl IntoResponse> {
    state
        .search()
        .retry()
        .map(|_| StatusCode::ACCEPTED)
        .map_err(unavailable)
}
