//! Index listing endpoint.

use axum::{Json, Router, routing::get};
use critics_dialog::application::query_handlers::{self, IndexListView};

use crate::state::AppState;

/// GET /indices
async fn list_indices() -> Json<IndexListView> {
    Json(query_handlers::index_names())
}

/// Returns the router for index metadata.
pub fn router() -> Router<AppState> {
    Router::new().route("/indices", get(list_indices))
}
