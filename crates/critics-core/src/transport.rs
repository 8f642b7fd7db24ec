//! Chat transport abstraction.
//!
//! The transport is the raw messaging-platform surface. Deciding whether a
//! prompt edits an existing message or is sent fresh happens above it, in
//! the dialog crate's gateway.

use async_trait::async_trait;

use crate::error::DomainError;

/// An inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Label shown to the user.
    pub label: String,
    /// Opaque token delivered back when the button is pressed.
    pub payload: String,
}

impl Button {
    /// Creates a button.
    #[must_use]
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound messaging operations.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message, with one button per keyboard row.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError>;

    /// Replace the text and keyboard of an existing message.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), DomainError>;
}
