//! Critic listing endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use critics_dialog::application::query_handlers::{self, DEFAULT_LIST_SIZE, page_size};
use critics_dialog::domain::records::Critic;
use tracing::instrument;

use super::SizeParams;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /critics
#[instrument(skip(state))]
async fn list_critics(
    State(state): State<AppState>,
    Query(params): Query<SizeParams>,
) -> Result<Json<Vec<Critic>>, ApiError> {
    let size = page_size(params.size, DEFAULT_LIST_SIZE);
    let critics = query_handlers::list_critics(size, &*state.search).await?;
    Ok(Json(critics))
}

/// Returns the router for registered critics.
pub fn router() -> Router<AppState> {
    Router::new().route("/critics", get(list_critics))
}
