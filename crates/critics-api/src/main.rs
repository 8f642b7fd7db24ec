//! TV critics query API entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use critics_dialog::domain::programs::ProgramCatalog;
use critics_storage::elasticsearch::EsDocumentStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use critics_api::error::AppError;
use critics_api::routes;
use critics_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting TV critics query API");

    // Read configuration from environment.
    let es_host = std::env::var("ELASTICSEARCH_HOST").unwrap_or_else(|_| "localhost".to_string());
    let es_port: u16 = std::env::var("ELASTICSEARCH_PORT")
        .unwrap_or_else(|_| "9200".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("ELASTICSEARCH_PORT must be a valid u16: {e}")))?;
    let catalog = match std::env::var("TV_PROGRAMS") {
        Ok(list) => ProgramCatalog::parse(&list)
            .map_err(|e| AppError::Config(format!("TV_PROGRAMS: {e}")))?,
        Err(_) => ProgramCatalog::default(),
    };
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

    // Build application state.
    let store = EsDocumentStore::from_host_port(&es_host, es_port).map_err(AppError::from)?;
    tracing::info!(url = store.base_url(), "using document store");
    let app_state = AppState::new(Arc::new(store), catalog);

    // Build router.
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::indices::router())
        .merge(routes::critics::router())
        .merge(routes::critiques::router())
        .merge(routes::game_registrants::router())
        .merge(routes::search::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;

    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}
