//! Game registrant listing endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use critics_dialog::application::query_handlers::{self, DEFAULT_LIST_SIZE, page_size};
use critics_dialog::domain::records::GameRegistrant;
use tracing::instrument;

use super::SizeParams;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /game-registrants
#[instrument(skip(state))]
async fn list_game_registrants(
    State(state): State<AppState>,
    Query(params): Query<SizeParams>,
) -> Result<Json<Vec<GameRegistrant>>, ApiError> {
    let size = page_size(params.size, DEFAULT_LIST_SIZE);
    let registrants = query_handlers::list_game_registrants(size, &*state.search).await?;
    Ok(Json(registrants))
}

/// Returns the router for game registrants.
pub fn router() -> Router<AppState> {
    Router::new().route("/game-registrants", get(list_game_registrants))
}
