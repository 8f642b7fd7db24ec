//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// The first three variants are local to a conversation turn: the user is
/// re-prompted and nothing changes. The remaining variants end the turn and
/// return the conversation to the main menu.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Bad free-form user input (blank name, unexpected message kind).
    #[error("validation error: {0}")]
    Validation(String),

    /// A menu selection that does not name a listed option.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// A critique submission carried both text and voice, or neither.
    #[error("a critique must be either text or voice")]
    TextOrVoice,

    /// State required by the current step is missing.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The document store or blob sink failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Any other fault caught at a turn boundary.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    /// Returns `true` for errors that re-prompt the current step instead of
    /// resetting the conversation.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidSelection(_) | Self::TextOrVoice
        )
    }
}
