//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use critics_core::repository::{Collection, DocumentSearch};
use critics_dialog::domain::programs::ProgramCatalog;
use critics_test_support::InMemoryDocumentStore;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use critics_api::routes;
use critics_api::state::AppState;

/// Build the full app router over `search`. Uses the same route structure as
/// `main.rs`.
pub fn build_test_app(search: Arc<dyn DocumentSearch>) -> Router {
    let app_state = AppState::new(search, ProgramCatalog::default());

    Router::new()
        .merge(routes::health::router())
        .merge(routes::indices::router())
        .merge(routes::critics::router())
        .merge(routes::critiques::router())
        .merge(routes::game_registrants::router())
        .merge(routes::search::router())
        .with_state(app_state)
}

/// A store holding one critic, two critiques and one game registrant.
pub fn seeded_store() -> Arc<InMemoryDocumentStore> {
    let store = InMemoryDocumentStore::new();
    store.insert(
        Collection::Critics,
        "7",
        json!({
            "user_id": 7,
            "first_name": "Ana",
            "last_name": "Lee",
            "phone": "+15551234",
            "timestamp": "2026-01-15T10:00:00+00:00"
        }),
    );
    store.insert(
        Collection::Critiques,
        "c1",
        json!({
            "user_id": 7,
            "program": "Turkish News",
            "received_id": "0000000000000000000000000000abcd",
            "file_path": "assets/Turkish_News/0000000000000000000000000000abcd.txt",
            "timestamp": "2026-01-15T10:05:00+00:00",
            "content_type": "text",
            "text_content": "Great episode!"
        }),
    );
    store.insert(
        Collection::Critiques,
        "c2",
        json!({
            "user_id": 7,
            "program": "Cooking Show",
            "received_id": "0000000000000000000000000000beef",
            "file_path": "assets/Cooking_Show/0000000000000000000000000000beef.ogg",
            "timestamp": "2026-01-15T10:06:00",
            "content_type": "voice",
            "voice_duration": 12
        }),
    );
    store.insert(
        Collection::GameRegistrants,
        "g1",
        json!({
            "user_id": 9,
            "player_name": "Player One",
            "registration_date": "2026-01-15T11:00:00+00:00"
        }),
    );
    Arc::new(store)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return only the status, for non-JSON responses.
pub async fn get_status(app: Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap().status()
}
