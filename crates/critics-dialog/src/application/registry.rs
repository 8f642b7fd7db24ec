//! Per-user session registry.
//!
//! Each user's session sits behind its own async mutex, held for a whole
//! turn, so events from one user are processed one at a time while other
//! users proceed concurrently. The map lock itself is only held to look up
//! or insert an entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use chrono::Duration;
use critics_core::clock::Clock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::records::UserId;
use crate::domain::session::DialogSession;

type SessionSlot = Arc<tokio::sync::Mutex<DialogSession>>;

/// Sessions keyed by user id.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<UserId, SessionSlot>>>,
    clock: Arc<dyn Clock>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    /// Creates an empty registry. Sessions idle longer than `idle_timeout`
    /// are eligible for eviction.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
            idle_timeout,
        }
    }

    /// How long a session may sit idle.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the session slot for `user_id`, creating an idle session on
    /// first contact.
    #[must_use]
    pub fn acquire(&self, user_id: UserId) -> SessionSlot {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = sessions.entry(user_id).or_insert_with(|| {
            Arc::new(tokio::sync::Mutex::new(DialogSession::new(self.clock.now())))
        });
        Arc::clone(slot)
    }

    /// A copy of the user's session, without creating one.
    pub async fn snapshot(&self, user_id: UserId) -> Option<DialogSession> {
        let slot = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    /// Number of tracked sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no sessions are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes sessions idle past the timeout and returns how many were
    /// dropped. Sessions in use by a turn (locked, or acquired but not yet
    /// locked) are kept.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => !session.is_idle(now, self.idle_timeout),
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    /// Runs [`SessionRegistry::evict_idle`] every `period` until the task is
    /// aborted.
    #[must_use]
    pub fn spawn_sweeper(&self, period: StdDuration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle();
                if evicted > 0 {
                    debug!(evicted, remaining = registry.len(), "evicted idle sessions");
                }
            }
        })
    }
}
