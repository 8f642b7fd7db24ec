//! The conversation state machine.
//!
//! [`DialogMachine::transition`] applies one inbound event to one session and
//! returns the next prompt. It mutates the session as it goes and may fail
//! part-way; callers run it against a working copy and only keep the copy
//! when the transition succeeds (see the conversation module).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use critics_core::blob::{BlobSink, ContentKind};
use critics_core::clock::Clock;
use critics_core::error::DomainError;
use critics_core::repository::{Collection, DocumentStore};
use critics_core::rng::DeterministicRng;
use critics_core::transport::Button;
use tracing::info;

use crate::domain::events::{
    ButtonAction, CANCEL_BUTTON, CRITICS_BUTTON, GAME_BUTTON, InboundEvent, Prompt,
    program_button_payload,
};
use crate::domain::messages::Messages;
use crate::domain::programs::ProgramCatalog;
use crate::domain::records::{Critic, Critique, GameRegistrant, UserId, excerpt, to_document};
use crate::domain::session::{CollectedFields, CriticStep, DialogSession, DialogState};
use crate::domain::submission::SubmissionId;

/// A critique payload that passed the "exactly one of text or voice" check.
enum CritiquePayload {
    Text(String),
    Voice { duration_seconds: u32, bytes: Vec<u8> },
}

impl CritiquePayload {
    fn from_event(event: InboundEvent) -> Result<Self, DomainError> {
        match event {
            InboundEvent::TextMessage(body) if !body.trim().is_empty() => Ok(Self::Text(body)),
            InboundEvent::VoicePayload(clip)
                if clip.caption.as_deref().is_none_or(|c| c.trim().is_empty()) =>
            {
                Ok(Self::Voice {
                    duration_seconds: clip.duration_seconds,
                    bytes: clip.bytes,
                })
            }
            _ => Err(DomainError::TextOrVoice),
        }
    }

    fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::Voice { .. } => ContentKind::Voice,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Self::Text(body) => body.as_bytes(),
            Self::Voice { bytes, .. } => bytes,
        }
    }

    fn into_critique(
        self,
        user_id: UserId,
        program: String,
        submission_id: &SubmissionId,
        stored_path: String,
        submitted_at: DateTime<Utc>,
    ) -> Critique {
        let content_kind = self.kind();
        let (text_excerpt, voice_duration_seconds) = match self {
            Self::Text(body) => (Some(excerpt(&body)), None),
            Self::Voice {
                duration_seconds, ..
            } => (None, Some(duration_seconds)),
        };
        Critique {
            user_id,
            program,
            submission_id: submission_id.to_string(),
            stored_path,
            submitted_at,
            content_kind,
            text_excerpt,
            voice_duration_seconds,
        }
    }
}

/// Drives the registration, program selection and submission dialog.
pub struct DialogMachine {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobSink>,
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    catalog: ProgramCatalog,
    messages: Messages,
}

impl DialogMachine {
    /// Creates a machine with the default program catalog and texts.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobSink>,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            store,
            blobs,
            clock,
            rng,
            catalog: ProgramCatalog::default(),
            messages: Messages::default(),
        }
    }

    /// Replaces the program catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: ProgramCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the user-facing texts.
    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// The clock used for record timestamps and session activity.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// The program catalog offered for selection.
    #[must_use]
    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    /// Applies `event` to `session` and returns the next prompt.
    ///
    /// Commands and the cancel button are honored in every state; every
    /// other event is dispatched on the session's current state.
    ///
    /// # Errors
    ///
    /// Returns a local `DomainError` (`Validation`, `InvalidSelection`,
    /// `TextOrVoice`) for bad input, `Precondition` when required state is
    /// missing, and `Storage`/`Unexpected` when a write or lookup fails.
    pub async fn transition(
        &self,
        session: &mut DialogSession,
        user_id: UserId,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        match (session.state, event) {
            (_, InboundEvent::Command(name)) => self.on_command(session, &name),
            (_, InboundEvent::ButtonPress(payload)) if payload == CANCEL_BUTTON => {
                Ok(self.cancel(session))
            }
            (DialogState::MainMenu, event) => self.on_main_menu(session, user_id, event).await,
            (DialogState::RegisterCritic(step), event) => {
                self.on_register_critic(session, user_id, step, event).await
            }
            (DialogState::SelectProgram, event) => self.on_select_program(session, event),
            (DialogState::SubmitCritique, event) => {
                self.on_submit_critique(session, user_id, event).await
            }
            (DialogState::RegisterGame, event) => {
                self.on_register_game(session, user_id, event).await
            }
        }
    }

    /// The prompt that belongs to the session's current state.
    #[must_use]
    pub fn current_prompt(&self, session: &DialogSession) -> Prompt {
        let m = &self.messages;
        match session.state {
            DialogState::MainMenu => self.main_menu_prompt(&m.welcome),
            DialogState::RegisterCritic(CriticStep::FirstName) => self.flow_prompt(&m.first_name),
            DialogState::RegisterCritic(CriticStep::LastName) => self.flow_prompt(&m.last_name),
            DialogState::RegisterCritic(CriticStep::Phone) => self.flow_prompt(&m.phone),
            DialogState::SelectProgram => self.program_prompt(&m.pick_program),
            DialogState::SubmitCritique => {
                self.flow_prompt(&self.submit_text(session.fields.selected_program.as_deref()))
            }
            DialogState::RegisterGame => self.flow_prompt(&m.game_prompt),
        }
    }

    /// Re-prompt for a local error: the reason followed by the current
    /// state's prompt.
    #[must_use]
    pub fn local_error_prompt(&self, session: &DialogSession, err: &DomainError) -> Prompt {
        let reason = match err {
            DomainError::Validation(reason) => reason.as_str(),
            DomainError::InvalidSelection(_) => self.messages.invalid_selection.as_str(),
            DomainError::TextOrVoice => self.messages.text_voice.as_str(),
            _ => self.messages.error.as_str(),
        };
        let current = self.current_prompt(session);
        Prompt::with_buttons(format!("{reason}\n{}", current.text), current.buttons)
    }

    /// The main menu, headed by a notice explaining why the flow ended.
    #[must_use]
    pub fn recovery_prompt(&self, err: &DomainError) -> Prompt {
        let notice = match err {
            DomainError::Precondition(_) => &self.messages.register_first,
            _ => &self.messages.error,
        };
        self.main_menu_prompt(&format!("{notice}\n{}", self.messages.welcome))
    }

    fn on_command(&self, session: &mut DialogSession, name: &str) -> Result<Prompt, DomainError> {
        match name {
            "start" => {
                session.reset();
                Ok(self.main_menu_prompt(&self.messages.welcome))
            }
            "cancel" => Ok(self.cancel(session)),
            _ => Err(DomainError::Validation(self.messages.unknown_command.clone())),
        }
    }

    fn cancel(&self, session: &mut DialogSession) -> Prompt {
        session.reset();
        self.main_menu_prompt(&format!(
            "{}\n{}",
            self.messages.cancelled, self.messages.welcome
        ))
    }

    async fn on_main_menu(
        &self,
        session: &mut DialogSession,
        user_id: UserId,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        let InboundEvent::ButtonPress(payload) = event else {
            return Err(DomainError::Validation(self.messages.choose_option.clone()));
        };
        match ButtonAction::parse(&payload) {
            ButtonAction::Critics => {
                session.fields = CollectedFields::default();
                if self.critic_exists(user_id).await? {
                    session.state = DialogState::SelectProgram;
                    Ok(self.program_prompt(&self.messages.pick_program))
                } else {
                    session.state = DialogState::RegisterCritic(CriticStep::FirstName);
                    Ok(self.flow_prompt(&self.messages.first_name))
                }
            }
            ButtonAction::Game => {
                session.fields = CollectedFields::default();
                session.state = DialogState::RegisterGame;
                Ok(self.flow_prompt(&self.messages.game_prompt))
            }
            _ => Err(DomainError::Validation(self.messages.choose_option.clone())),
        }
    }

    async fn on_register_critic(
        &self,
        session: &mut DialogSession,
        user_id: UserId,
        step: CriticStep,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        let value = self.required_text(event)?;
        match step {
            CriticStep::FirstName => {
                session.fields.first_name = Some(value);
                session.state = DialogState::RegisterCritic(CriticStep::LastName);
                Ok(self.flow_prompt(&self.messages.last_name))
            }
            CriticStep::LastName => {
                session.fields.last_name = Some(value);
                session.state = DialogState::RegisterCritic(CriticStep::Phone);
                Ok(self.flow_prompt(&self.messages.phone))
            }
            CriticStep::Phone => {
                let (Some(first_name), Some(last_name)) = (
                    session.fields.first_name.clone(),
                    session.fields.last_name.clone(),
                ) else {
                    return Err(DomainError::Precondition(
                        "critic registration reached the phone step without a name".to_owned(),
                    ));
                };
                let critic = Critic {
                    user_id,
                    first_name,
                    last_name,
                    phone: value.clone(),
                    registered_at: self.clock.now(),
                };
                let id = user_id.to_string();
                self.store
                    .put(Collection::Critics, Some(&id), to_document(&critic)?)
                    .await?;
                info!(user_id, "critic registered");

                session.fields.phone = Some(value);
                session.state = DialogState::SelectProgram;
                Ok(self.program_prompt(&self.messages.registered))
            }
        }
    }

    fn on_select_program(
        &self,
        session: &mut DialogSession,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        let kind = event.kind();
        let InboundEvent::ButtonPress(payload) = event else {
            return Err(DomainError::InvalidSelection(format!(
                "expected a program button, got {kind}"
            )));
        };
        let ButtonAction::Program(raw) = ButtonAction::parse(&payload) else {
            return Err(DomainError::InvalidSelection(format!(
                "unexpected button {payload:?}"
            )));
        };
        let index: usize = raw.parse().map_err(|_| {
            DomainError::InvalidSelection(format!("malformed program index {raw:?}"))
        })?;
        let program = self.catalog.get(index).ok_or_else(|| {
            DomainError::InvalidSelection(format!("program index {index} is out of range"))
        })?;

        session.fields.selected_program = Some(program.to_owned());
        session.state = DialogState::SubmitCritique;
        Ok(self.flow_prompt(&self.submit_text(Some(program))))
    }

    async fn on_submit_critique(
        &self,
        session: &mut DialogSession,
        user_id: UserId,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        let Some(program) = session.fields.selected_program.clone() else {
            return Err(DomainError::Precondition("no program selected".to_owned()));
        };
        if !self.catalog.contains(&program) {
            return Err(DomainError::Precondition(format!(
                "program {program:?} is not offered"
            )));
        }
        if !self.critic_exists(user_id).await? {
            return Err(DomainError::Precondition(format!(
                "user {user_id} is not a registered critic"
            )));
        }

        let payload = CritiquePayload::from_event(event)?;
        let submission_id = self.next_submission_id()?;
        let stored_path = self
            .blobs
            .store(&program, submission_id.as_str(), payload.kind(), payload.bytes())
            .await?;
        let critique = payload.into_critique(
            user_id,
            program,
            &submission_id,
            stored_path,
            self.clock.now(),
        );
        self.store
            .put(Collection::Critiques, None, to_document(&critique)?)
            .await?;
        info!(
            user_id,
            submission_id = %submission_id,
            program = %critique.program,
            content_kind = ?critique.content_kind,
            "critique stored"
        );

        session.reset();
        Ok(self.main_menu_prompt(&format!(
            "{}\n{} {submission_id}",
            self.messages.saved, self.messages.show_id
        )))
    }

    async fn on_register_game(
        &self,
        session: &mut DialogSession,
        user_id: UserId,
        event: InboundEvent,
    ) -> Result<Prompt, DomainError> {
        let player_name = self.required_text(event)?;
        let registrant = GameRegistrant {
            user_id,
            player_name,
            registered_at: self.clock.now(),
        };
        self.store
            .put(Collection::GameRegistrants, None, to_document(&registrant)?)
            .await?;
        info!(user_id, "game registrant stored");

        session.reset();
        Ok(self.main_menu_prompt(&format!(
            "{}\n{}",
            self.messages.game_registered, self.messages.welcome
        )))
    }

    async fn critic_exists(&self, user_id: UserId) -> Result<bool, DomainError> {
        let critic = self
            .store
            .get(Collection::Critics, &user_id.to_string())
            .await?;
        Ok(critic.is_some())
    }

    fn next_submission_id(&self) -> Result<SubmissionId, DomainError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| DomainError::Unexpected(format!("RNG mutex poisoned: {e}")))?;
        Ok(SubmissionId::generate(&mut *rng))
    }

    /// Trimmed, non-empty text from a typed message.
    fn required_text(&self, event: InboundEvent) -> Result<String, DomainError> {
        let InboundEvent::TextMessage(body) = event else {
            return Err(DomainError::Validation(self.messages.text_only.clone()));
        };
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(self.messages.empty_input.clone()));
        }
        Ok(trimmed.to_owned())
    }

    fn submit_text(&self, program: Option<&str>) -> String {
        match program {
            Some(program) => format!(
                "{}\n{} {program}",
                self.messages.send_critique, self.messages.program_label
            ),
            None => self.messages.send_critique.clone(),
        }
    }

    fn main_menu_prompt(&self, text: &str) -> Prompt {
        Prompt::with_buttons(
            text,
            vec![
                Button::new(&self.messages.critics_option, CRITICS_BUTTON),
                Button::new(&self.messages.game_option, GAME_BUTTON),
            ],
        )
    }

    fn program_prompt(&self, text: &str) -> Prompt {
        let mut buttons: Vec<Button> = self
            .catalog
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| Button::new(name, program_button_payload(i)))
            .collect();
        buttons.push(self.cancel_button());
        Prompt::with_buttons(text, buttons)
    }

    fn flow_prompt(&self, text: &str) -> Prompt {
        Prompt::with_buttons(text, vec![self.cancel_button()])
    }

    fn cancel_button(&self) -> Button {
        Button::new(&self.messages.cancel_option, CANCEL_BUTTON)
    }
}
