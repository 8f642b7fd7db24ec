//! Message gateway: renders prompts through a [`ChatTransport`].
//!
//! Button-originated turns update the prompt that carried the keyboard, so
//! the chat does not fill up with stale menus. Typed turns always get a new
//! message.

use std::sync::Arc;

use critics_core::error::DomainError;
use critics_core::transport::ChatTransport;
use tracing::warn;

use crate::domain::events::{Origin, Prompt, TurnContext};

/// Routes prompts to "edit" or "send" depending on the turn's origin.
#[derive(Clone)]
pub struct MessageGateway {
    transport: Arc<dyn ChatTransport>,
}

impl MessageGateway {
    /// Creates a gateway over `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Renders `prompt` for the turn described by `ctx`.
    ///
    /// A failed edit (the original prompt was deleted or is too old) falls
    /// back to sending a fresh message. A failed callback acknowledgment is
    /// only logged.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the message could not be delivered at
    /// all.
    pub async fn render(&self, ctx: &TurnContext, prompt: &Prompt) -> Result<(), DomainError> {
        match &ctx.origin {
            Origin::Message => {
                self.transport
                    .send_message(ctx.chat_id, &prompt.text, &prompt.buttons)
                    .await
            }
            Origin::Button {
                callback_id,
                message_id,
            } => {
                if let Err(e) = self.transport.answer_callback(callback_id).await {
                    warn!(user_id = ctx.user_id, error = %e, "failed to acknowledge button press");
                }
                match self
                    .transport
                    .edit_message(ctx.chat_id, *message_id, &prompt.text, &prompt.buttons)
                    .await
                {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(
                            user_id = ctx.user_id,
                            message_id,
                            error = %e,
                            "editing prompt failed; sending a new message"
                        );
                        self.transport
                            .send_message(ctx.chat_id, &prompt.text, &prompt.buttons)
                            .await
                    }
                }
            }
        }
    }
}
