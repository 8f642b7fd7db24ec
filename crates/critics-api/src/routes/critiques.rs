//! Critique listing endpoints.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use critics_dialog::application::query_handlers::{
    self, DEFAULT_FILTER_SIZE, DEFAULT_LIST_SIZE, page_size,
};
use critics_dialog::domain::records::{Critique, UserId};
use tracing::{debug, instrument};

use super::SizeParams;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /critiques
#[instrument(skip(state))]
async fn list_critiques(
    State(state): State<AppState>,
    Query(params): Query<SizeParams>,
) -> Result<Json<Vec<Critique>>, ApiError> {
    let size = page_size(params.size, DEFAULT_LIST_SIZE);
    let critiques = query_handlers::list_critiques(size, &*state.search).await?;
    Ok(Json(critiques))
}

/// GET /critiques/by-program/{program}
#[instrument(skip(state))]
async fn critiques_by_program(
    State(state): State<AppState>,
    Path(program): Path<String>,
    Query(params): Query<SizeParams>,
) -> Result<Json<Vec<Critique>>, ApiError> {
    let size = page_size(params.size, DEFAULT_FILTER_SIZE);
    let critiques =
        query_handlers::critiques_by_program(&program, size, &state.catalog, &*state.search)
            .await?;
    debug!(count = critiques.len(), "critiques by program");
    Ok(Json(critiques))
}

/// GET /critiques/by-user/{user_id}
#[instrument(skip(state))]
async fn critiques_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<SizeParams>,
) -> Result<Json<Vec<Critique>>, ApiError> {
    let size = page_size(params.size, DEFAULT_FILTER_SIZE);
    let critiques = query_handlers::critiques_by_user(user_id, size, &*state.search).await?;
    Ok(Json(critiques))
}

/// Returns the router for critiques.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/critiques", get(list_critiques))
        .route("/critiques/by-program/{program}", get(critiques_by_program))
        .route("/critiques/by-user/{user_id}", get(critiques_by_user))
}
