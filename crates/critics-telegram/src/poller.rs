//! Long-polling update loop.
//!
//! Updates are routed to one lane per user. A lane is a task that handles
//! that user's updates strictly in arrival order, voice downloads included,
//! while lanes of different users run concurrently. An idle lane closes
//! itself after handling whatever was already queued.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use critics_core::error::DomainError;
use critics_dialog::application::conversation::Conversation;
use critics_dialog::domain::events::{InboundEvent, VoiceClip};
use critics_dialog::domain::records::UserId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::SendError};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::client::TelegramClient;
use crate::types::Update;
use crate::updates::{Inbound, classify};

/// Long-poll timeout passed to `getUpdates`.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a lane waits for its next update before closing.
pub const LANE_IDLE: Duration = Duration::from_secs(60);

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches updates and dispatches them to the conversation.
pub struct Poller {
    client: Arc<TelegramClient>,
    conversation: Conversation,
    poll_timeout: Duration,
}

impl Poller {
    /// Creates a poller using [`POLL_TIMEOUT`].
    #[must_use]
    pub fn new(client: Arc<TelegramClient>, conversation: Conversation) -> Self {
        Self {
            client,
            conversation,
            poll_timeout: POLL_TIMEOUT,
        }
    }

    /// Overrides the long-poll timeout.
    #[must_use]
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Polls until `shutdown` resolves, then gives queued and in-flight
    /// turns a short grace period to finish.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        let mut backoff = INITIAL_BACKOFF;
        let mut lanes: HashMap<UserId, UnboundedSender<Inbound>> = HashMap::new();
        let mut workers = JoinSet::new();

        loop {
            while workers.try_join_next().is_some() {}
            lanes.retain(|_, tx| !tx.is_closed());

            let batch = tokio::select! {
                () = &mut shutdown => break,
                batch = self.client.get_updates(offset, self.poll_timeout.as_secs()) => batch,
            };

            match batch {
                Ok(updates) => {
                    backoff = INITIAL_BACKOFF;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let update_id = update.update_id;
                        match classify(update) {
                            Some(inbound) => self.route(&mut lanes, &mut workers, inbound),
                            None => debug!(update_id, "ignoring update"),
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, retry_in = ?backoff, "getUpdates failed");
                    tokio::select! {
                        () = &mut shutdown => break,
                        () = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }

        info!(lanes = workers.len(), "poller stopping");
        drop(lanes);
        let drain = async { while workers.join_next().await.is_some() {} };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            warn!("abandoning turns still running at shutdown");
        }
    }

    /// Queues `inbound` on its user's lane, opening a lane if the user has
    /// none or the previous one has closed.
    fn route(
        &self,
        lanes: &mut HashMap<UserId, UnboundedSender<Inbound>>,
        workers: &mut JoinSet<()>,
        inbound: Inbound,
    ) {
        let user_id = inbound.context().user_id;
        let inbound = match lanes.get(&user_id) {
            Some(tx) => match tx.send(inbound) {
                Ok(()) => return,
                Err(SendError(inbound)) => inbound,
            },
            None => inbound,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        if tx.send(inbound).is_ok() {
            workers.spawn(run_lane(
                Arc::clone(&self.client),
                self.conversation.clone(),
                rx,
            ));
            lanes.insert(user_id, tx);
        }
    }
}

/// Handles one user's updates in order until the poller drops the sender or
/// the lane sits idle for [`LANE_IDLE`].
async fn run_lane(
    client: Arc<TelegramClient>,
    conversation: Conversation,
    mut rx: UnboundedReceiver<Inbound>,
) {
    loop {
        match tokio::time::timeout(LANE_IDLE, rx.recv()).await {
            Ok(Some(inbound)) => handle(&client, &conversation, inbound).await,
            Ok(None) => return,
            Err(_) => {
                // Refuse new updates, then finish the ones already queued.
                rx.close();
                while let Some(inbound) = rx.recv().await {
                    handle(&client, &conversation, inbound).await;
                }
                return;
            }
        }
    }
}

/// Handles one update end to end, outside of any lane.
pub async fn dispatch(client: Arc<TelegramClient>, conversation: Conversation, update: Update) {
    let update_id = update.update_id;
    match classify(update) {
        Some(inbound) => handle(&client, &conversation, inbound).await,
        None => debug!(update_id, "ignoring update"),
    }
}

async fn handle(client: &TelegramClient, conversation: &Conversation, inbound: Inbound) {
    match inbound {
        Inbound::Ready { ctx, event } => {
            conversation.handle_turn(ctx, event).await;
        }
        Inbound::Voice {
            ctx,
            file_id,
            duration_seconds,
            caption,
        } => match client.download_file(&file_id).await {
            Ok(bytes) => {
                let clip = VoiceClip {
                    duration_seconds,
                    bytes,
                    caption,
                };
                conversation
                    .handle_turn(ctx, InboundEvent::VoicePayload(clip))
                    .await;
            }
            Err(e) => {
                error!(user_id = ctx.user_id, error = %e, "voice download failed");
                conversation
                    .abort_turn(ctx, DomainError::from(e))
                    .await;
            }
        },
    }
}
