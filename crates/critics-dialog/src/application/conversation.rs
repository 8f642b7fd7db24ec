//! The turn boundary.
//!
//! [`Conversation::handle_turn`] is the only entry point for inbound events.
//! Whatever happens inside the state machine, the user gets a reply and the
//! session ends the turn in a defined state.

use std::sync::Arc;

use chrono::Duration;
use critics_core::error::DomainError;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use super::gateway::MessageGateway;
use super::registry::SessionRegistry;
use super::state_machine::DialogMachine;
use crate::domain::events::{InboundEvent, Prompt, TurnContext};

/// Default idle time after which a session starts over at the main menu.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Serializes turns per user and converts every failure into a reply.
#[derive(Clone)]
pub struct Conversation {
    machine: Arc<DialogMachine>,
    sessions: SessionRegistry,
    gateway: MessageGateway,
}

impl Conversation {
    /// Creates a conversation whose sessions expire after `idle_timeout`.
    #[must_use]
    pub fn new(machine: DialogMachine, gateway: MessageGateway, idle_timeout: Duration) -> Self {
        let sessions = SessionRegistry::new(machine.clock(), idle_timeout);
        Self {
            machine: Arc::new(machine),
            sessions,
            gateway,
        }
    }

    /// The session registry, for eviction and inspection.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Processes one inbound event for `ctx.user_id` and renders the reply.
    ///
    /// The transition runs on its own task against a copy of the session.
    /// The copy replaces the session only on success. Local errors re-prompt
    /// the unchanged step; every other failure, including a panic, resets
    /// the session to the main menu. Rendering failures are logged.
    pub async fn handle_turn(&self, ctx: TurnContext, event: InboundEvent) -> Prompt {
        let span = info_span!(
            "turn",
            turn_id = %Uuid::new_v4(),
            user_id = ctx.user_id,
            event = event.kind()
        );
        self.run_turn(ctx, event).instrument(span).await
    }

    /// Ends the user's current flow because of a failure that happened
    /// before an event could be built (for example a voice download error).
    pub async fn abort_turn(&self, ctx: TurnContext, err: DomainError) -> Prompt {
        let slot = self.sessions.acquire(ctx.user_id);
        let mut session = slot.lock().await;
        error!(user_id = ctx.user_id, error = %err, "turn aborted before dispatch");
        session.reset();
        let prompt = self.machine.recovery_prompt(&err);
        self.deliver(&ctx, &prompt).await;
        prompt
    }

    async fn run_turn(&self, ctx: TurnContext, event: InboundEvent) -> Prompt {
        let slot = self.sessions.acquire(ctx.user_id);
        let mut session = slot.lock().await;

        let now = self.machine.clock().now();
        if session.is_idle(now, self.sessions.idle_timeout()) {
            debug!("session idle past timeout; starting over");
            session.reset();
        }
        session.last_activity = now;

        let mut working = session.clone();
        let machine = Arc::clone(&self.machine);
        let user_id = ctx.user_id;
        let outcome = tokio::spawn(
            async move {
                let result = machine.transition(&mut working, user_id, event).await;
                (working, result)
            }
            .in_current_span(),
        )
        .await;

        let prompt = match outcome {
            Ok((next, Ok(prompt))) => {
                *session = next;
                prompt
            }
            Ok((_, Err(err))) if err.is_local() => {
                debug!(error = %err, "re-prompting after invalid input");
                self.machine.local_error_prompt(&session, &err)
            }
            Ok((_, Err(err))) => {
                match &err {
                    DomainError::Precondition(_) => warn!(error = %err, "turn precondition failed"),
                    _ => error!(error = %err, "turn failed"),
                }
                session.reset();
                self.machine.recovery_prompt(&err)
            }
            Err(join_error) => {
                let err = DomainError::Unexpected(join_error.to_string());
                error!(error = %err, "turn panicked");
                session.reset();
                self.machine.recovery_prompt(&err)
            }
        };

        self.deliver(&ctx, &prompt).await;
        prompt
    }

    async fn deliver(&self, ctx: &TurnContext, prompt: &Prompt) {
        if let Err(e) = self.gateway.render(ctx, prompt).await {
            error!(user_id = ctx.user_id, error = %e, "failed to deliver reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use critics_core::blob::ContentKind;
    use critics_core::repository::{Collection, Document, DocumentStore};
    use critics_core::rng::DeterministicRng;
    use critics_test_support::{
        FixedClock, InMemoryDocumentStore, ManualClock, MemoryBlobSink, RecordingTransport,
        SequenceRng, TransportCall,
    };

    use super::*;
    use crate::domain::events::{CRITICS_BUTTON, GAME_BUTTON, program_button_payload};
    use crate::domain::messages::Messages;
    use crate::domain::programs::ProgramCatalog;
    use crate::domain::records::{Critique, from_document};
    use crate::domain::session::{CriticStep, DialogState};
    use crate::domain::submission::SubmissionId;

    const USER: i64 = 1001;
    const CHAT: i64 = 2002;

    struct Harness {
        store: Arc<InMemoryDocumentStore>,
        blobs: Arc<MemoryBlobSink>,
        transport: Arc<RecordingTransport>,
        conversation: Conversation,
    }

    /// Builds a conversation over `store`; `inspect` is the store the test
    /// reads back from (the same one unless `store` is a failure double).
    fn build(inspect: Arc<InMemoryDocumentStore>, store: Arc<dyn DocumentStore>) -> Harness {
        let blobs = Arc::new(MemoryBlobSink::new());
        let transport = Arc::new(RecordingTransport::new());
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SequenceRng::new(vec![0x1234_5678, 0x9ABC])));
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let machine = DialogMachine::new(store, blobs.clone(), clock, rng);
        let conversation = Conversation::new(
            machine,
            MessageGateway::new(transport.clone()),
            Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
        );
        Harness {
            store: inspect,
            blobs,
            transport,
            conversation,
        }
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryDocumentStore::new());
        build(store.clone(), store)
    }

    fn harness_with_store(store: Arc<dyn DocumentStore>) -> Harness {
        build(Arc::new(InMemoryDocumentStore::new()), store)
    }

    fn typed() -> TurnContext {
        TurnContext::message(USER, CHAT)
    }

    fn pressed() -> TurnContext {
        TurnContext::button(USER, CHAT, "cb", 77)
    }

    async fn say(h: &Harness, body: &str) -> Prompt {
        h.conversation
            .handle_turn(typed(), InboundEvent::TextMessage(body.to_owned()))
            .await
    }

    async fn press(h: &Harness, payload: &str) -> Prompt {
        h.conversation
            .handle_turn(pressed(), InboundEvent::ButtonPress(payload.to_owned()))
            .await
    }

    async fn state_of(h: &Harness) -> DialogState {
        h.conversation
            .sessions()
            .snapshot(USER)
            .await
            .map(|s| s.state)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_end_to_end_registration_and_text_critique() {
        // Arrange
        let h = harness();

        // Act
        let welcome = h
            .conversation
            .handle_turn(typed(), InboundEvent::Command("start".to_owned()))
            .await;
        press(&h, CRITICS_BUTTON).await;
        say(&h, "Ana").await;
        say(&h, "Lee").await;
        let programs = say(&h, "+15551234").await;
        press(&h, &program_button_payload(1)).await;
        let receipt = say(&h, "Great episode!").await;

        // Assert
        assert_eq!(welcome.text, Messages::default().welcome);
        assert_eq!(programs.text, Messages::default().registered);

        let token = SubmissionId::from_bits(0x1234_5678).to_string();
        assert!(receipt.text.contains(&token));

        let critiques = h.store.documents(Collection::Critiques);
        assert_eq!(critiques.len(), 1);
        let critique: Critique = from_document(critiques[0].1.clone()).unwrap();
        assert_eq!(
            Some(critique.program.as_str()),
            ProgramCatalog::default().get(1)
        );
        assert_eq!(critique.text_excerpt.as_deref(), Some("Great episode!"));
        assert_eq!(critique.submission_id, token);
        assert_eq!(critique.content_kind, ContentKind::Text);
        assert_eq!(h.store.count(Collection::Critics), 1);

        assert_eq!(state_of(&h).await, DialogState::MainMenu);
        let session = h.conversation.sessions().snapshot(USER).await.unwrap();
        assert!(session.fields.is_empty());

        let last_sent = h.transport.texts().last().cloned().unwrap();
        assert!(last_sent.contains(&token));
    }

    #[tokio::test]
    async fn test_registered_critic_goes_straight_to_program_selection() {
        // Arrange
        let h = harness();
        h.store.insert(
            Collection::Critics,
            &USER.to_string(),
            serde_json::json!({
                "user_id": USER,
                "first_name": "Ana",
                "last_name": "Lee",
                "phone": "+15551234",
                "timestamp": "2026-01-01T00:00:00+00:00"
            }),
        );

        // Act
        let prompt = press(&h, CRITICS_BUTTON).await;

        // Assert
        assert_eq!(state_of(&h).await, DialogState::SelectProgram);
        assert_eq!(prompt.text, Messages::default().pick_program);
        let texts = h.transport.texts();
        assert!(!texts.iter().any(|t| t == &Messages::default().first_name));
    }

    #[tokio::test]
    async fn test_submission_without_registration_resets_and_writes_nothing() {
        // Arrange
        let h = harness();
        {
            let slot = h.conversation.sessions().acquire(USER);
            let mut session = slot.lock().await;
            session.state = DialogState::SubmitCritique;
            session.fields.selected_program = Some("Love Island".to_owned());
        }

        // Act
        let prompt = say(&h, "Great episode!").await;

        // Assert
        assert!(prompt.text.starts_with(&Messages::default().register_first));
        assert_eq!(state_of(&h).await, DialogState::MainMenu);
        assert_eq!(h.store.total(), 0);
        assert!(h.blobs.stored().is_empty());
    }

    #[tokio::test]
    async fn test_validation_error_keeps_step_and_reprompts() {
        // Arrange
        let h = harness();
        press(&h, CRITICS_BUTTON).await;
        say(&h, "Ana").await;

        // Act
        let prompt = say(&h, "   ").await;

        // Assert
        assert_eq!(
            prompt.text,
            format!(
                "{}\n{}",
                Messages::default().empty_input,
                Messages::default().last_name
            )
        );
        let session = h.conversation.sessions().snapshot(USER).await.unwrap();
        assert_eq!(
            session.state,
            DialogState::RegisterCritic(CriticStep::LastName)
        );
        assert_eq!(session.fields.first_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_cancelled_registration_leaves_no_residual_fields() {
        // Arrange
        let h = harness();
        press(&h, CRITICS_BUTTON).await;
        say(&h, "Ana").await;
        say(&h, "Lee").await;

        // Act
        h.conversation
            .handle_turn(typed(), InboundEvent::Command("cancel".to_owned()))
            .await;
        press(&h, CRITICS_BUTTON).await;

        // Assert
        let session = h.conversation.sessions().snapshot(USER).await.unwrap();
        assert_eq!(
            session.state,
            DialogState::RegisterCritic(CriticStep::FirstName)
        );
        assert!(session.fields.is_empty());
        assert_eq!(h.store.total(), 0);
    }

    #[tokio::test]
    async fn test_button_turns_edit_the_pressed_prompt() {
        let h = harness();

        press(&h, GAME_BUTTON).await;

        let calls = h.transport.calls();
        assert!(matches!(calls[0], TransportCall::Answer { .. }));
        assert!(matches!(
            calls[1],
            TransportCall::Edit {
                chat_id: CHAT,
                message_id: 77,
                ..
            }
        ));
    }

    struct PanickingStore;

    #[async_trait]
    impl DocumentStore for PanickingStore {
        async fn get(
            &self,
            _collection: Collection,
            _id: &str,
        ) -> Result<Option<Document>, DomainError> {
            panic!("index shard exploded");
        }

        async fn put(
            &self,
            _collection: Collection,
            _id: Option<&str>,
            _document: Document,
        ) -> Result<String, DomainError> {
            panic!("index shard exploded");
        }
    }

    #[tokio::test]
    async fn test_panicking_turn_is_reported_and_session_reset() {
        // Arrange
        let h = harness_with_store(Arc::new(PanickingStore));
        press(&h, GAME_BUTTON).await;

        // Act
        let prompt = say(&h, "Player One").await;

        // Assert
        assert!(prompt.text.starts_with(&Messages::default().error));
        assert_eq!(state_of(&h).await, DialogState::MainMenu);
    }

    #[tokio::test]
    async fn test_storage_failure_resets_to_main_menu() {
        // Arrange
        let h = harness_with_store(Arc::new(critics_test_support::FailingDocumentStore));
        press(&h, GAME_BUTTON).await;

        // Act
        let prompt = say(&h, "Player One").await;

        // Assert
        assert!(prompt.text.starts_with(&Messages::default().error));
        let session = h.conversation.sessions().snapshot(USER).await.unwrap();
        assert_eq!(session.state, DialogState::MainMenu);
        assert!(session.fields.is_empty());
    }

    #[tokio::test]
    async fn test_abort_turn_resets_session_and_notifies_user() {
        let h = harness();
        press(&h, GAME_BUTTON).await;

        let prompt = h
            .conversation
            .abort_turn(typed(), DomainError::Storage("download failed".to_owned()))
            .await;

        assert!(prompt.text.starts_with(&Messages::default().error));
        assert_eq!(state_of(&h).await, DialogState::MainMenu);
    }

    #[tokio::test]
    async fn test_idle_session_starts_over_at_main_menu() {
        // Arrange
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let store = Arc::new(InMemoryDocumentStore::new());
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SequenceRng::new(vec![])));
        let machine = DialogMachine::new(
            store.clone(),
            Arc::new(MemoryBlobSink::new()),
            clock.clone(),
            rng,
        );
        let conversation = Conversation::new(
            machine,
            MessageGateway::new(Arc::new(RecordingTransport::new())),
            Duration::minutes(30),
        );
        conversation
            .handle_turn(
                TurnContext::button(USER, CHAT, "cb", 1),
                InboundEvent::ButtonPress(GAME_BUTTON.to_owned()),
            )
            .await;
        clock.advance(Duration::minutes(45));

        // Act
        conversation
            .handle_turn(typed(), InboundEvent::TextMessage("Player One".to_owned()))
            .await;

        // Assert
        assert_eq!(store.count(Collection::GameRegistrants), 0);
        let session = conversation.sessions().snapshot(USER).await.unwrap();
        assert_eq!(session.state, DialogState::MainMenu);
    }

    #[tokio::test]
    async fn test_queued_turns_for_one_user_run_in_arrival_order() {
        // Arrange
        let h = harness();
        press(&h, CRITICS_BUTTON).await;

        // Act: the session mutex is FIFO, so the turn that queues first
        // runs first.
        let (_, _) = tokio::join!(say(&h, "Ana"), say(&h, "Lee"));

        // Assert
        let session = h.conversation.sessions().snapshot(USER).await.unwrap();
        assert_eq!(session.state, DialogState::RegisterCritic(CriticStep::Phone));
        assert_eq!(session.fields.first_name.as_deref(), Some("Ana"));
        assert_eq!(session.fields.last_name.as_deref(), Some("Lee"));
    }
}
