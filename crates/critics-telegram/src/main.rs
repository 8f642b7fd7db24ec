//! TV critics bot entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use critics_core::clock::SystemClock;
use critics_core::rng::{DeterministicRng, OsSeededRng};
use critics_dialog::application::conversation::Conversation;
use critics_dialog::application::gateway::MessageGateway;
use critics_dialog::application::state_machine::DialogMachine;
use critics_storage::elasticsearch::EsDocumentStore;
use critics_storage::fs_blob_sink::FsBlobSink;
use critics_telegram::client::TelegramClient;
use critics_telegram::config::BotConfig;
use critics_telegram::error::AppError;
use critics_telegram::poller::{POLL_TIMEOUT, Poller};
use tracing_subscriber::EnvFilter;

const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting TV critics bot");

    let config = BotConfig::from_env()?;

    // Document store. The bot keeps running if provisioning fails; writes
    // surface storage errors per turn until the cluster is back.
    let store = Arc::new(
        EsDocumentStore::from_host_port(&config.elasticsearch_host, config.elasticsearch_port)
            .map_err(AppError::from)?,
    );
    match store.ensure_indices().await {
        Ok(created) => tracing::info!(?created, url = store.base_url(), "indices ready"),
        Err(e) => tracing::warn!(error = %e, "could not provision indices"),
    }

    let client = Arc::new(
        TelegramClient::new(&config.telegram_api_url, &config.telegram_token, POLL_TIMEOUT)
            .map_err(AppError::from)?,
    );
    let me = client.get_me().await.map_err(AppError::from)?;
    tracing::info!(bot = me.username.as_deref().unwrap_or(&me.first_name), "authenticated");

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(OsSeededRng::new()));
    let machine = DialogMachine::new(
        store,
        Arc::new(FsBlobSink::new(config.assets_dir.clone())),
        Arc::new(SystemClock),
        rng,
    )
    .with_catalog(config.programs.clone());
    let conversation = Conversation::new(
        machine,
        MessageGateway::new(client.clone()),
        config.session_idle,
    );

    let sweeper = conversation.sessions().spawn_sweeper(SWEEP_PERIOD);
    Poller::new(client, conversation).run(shutdown_signal()).await;
    sweeper.abort();

    tracing::info!("Bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
