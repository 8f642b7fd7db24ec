//! Full-text search endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use critics_core::repository::SearchHit;
use critics_dialog::application::query_handlers::{self, DEFAULT_SEARCH_SIZE, page_size};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Free-text query, matched fuzzily against every field.
    pub query: String,
    /// Maximum number of hits to return.
    pub size: Option<usize>,
}

/// GET /search
#[instrument(skip(state))]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let size = page_size(params.size, DEFAULT_SEARCH_SIZE);
    let hits = query_handlers::search_all(&params.query, size, &*state.search).await?;
    Ok(Json(hits))
}

/// Returns the router for search.
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}
