//! Per-user conversation progress.

use chrono::{DateTime, Duration, Utc};

/// Sub-steps of critic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriticStep {
    /// Waiting for the first name.
    FirstName,
    /// Waiting for the last name.
    LastName,
    /// Waiting for the phone number.
    Phone,
}

/// Where a user is in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    /// Idle: the welcome menu is showing.
    #[default]
    MainMenu,
    /// Collecting critic details.
    RegisterCritic(CriticStep),
    /// Waiting for a program button.
    SelectProgram,
    /// Waiting for a text or voice critique.
    SubmitCritique,
    /// Waiting for a player name.
    RegisterGame,
}

/// Values collected so far in the current flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedFields {
    /// Critic first name.
    pub first_name: Option<String>,
    /// Critic last name.
    pub last_name: Option<String>,
    /// Critic phone number.
    pub phone: Option<String>,
    /// Program chosen for the next critique.
    pub selected_program: Option<String>,
}

impl CollectedFields {
    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Transient conversation state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSession {
    /// Current state.
    pub state: DialogState,
    /// Fields accumulated for the next write.
    pub fields: CollectedFields,
    /// Time of the last inbound event.
    pub last_activity: DateTime<Utc>,
}

impl DialogSession {
    /// A fresh idle session.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: DialogState::MainMenu,
            fields: CollectedFields::default(),
            last_activity: now,
        }
    }

    /// Back to the main menu with nothing collected.
    pub fn reset(&mut self) {
        self.state = DialogState::MainMenu;
        self.fields = CollectedFields::default();
    }

    /// Whether no event has arrived for longer than `timeout`.
    #[must_use]
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }
}
