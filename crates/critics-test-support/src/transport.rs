//! Test transport — records every outbound chat operation.

use std::sync::Mutex;

use async_trait::async_trait;
use critics_core::error::DomainError;
use critics_core::transport::{Button, ChatTransport};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `send_message`.
    Send {
        /// Target chat.
        chat_id: i64,
        /// Message text.
        text: String,
        /// Keyboard buttons.
        buttons: Vec<Button>,
    },
    /// `edit_message`.
    Edit {
        /// Target chat.
        chat_id: i64,
        /// Message being edited.
        message_id: i64,
        /// New text.
        text: String,
        /// New keyboard.
        buttons: Vec<Button>,
    },
    /// `answer_callback`.
    Answer {
        /// Callback query id.
        callback_id: String,
    },
}

/// A transport that records calls. Edits can be configured to fail, as when
/// the original prompt has been deleted.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<TransportCall>>,
    fail_edits: bool,
}

impl RecordingTransport {
    /// Create a transport where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose `edit_message` calls fail (after recording).
    #[must_use]
    pub fn with_failing_edits() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_edits: true,
        }
    }

    /// Returns a snapshot of all recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of every sent or edited message, in order.
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Send { text, .. } | TransportCall::Edit { text, .. } => Some(text),
                TransportCall::Answer { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(TransportCall::Send {
            chat_id,
            text: text.to_owned(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(TransportCall::Edit {
            chat_id,
            message_id,
            text: text.to_owned(),
            buttons: buttons.to_vec(),
        });
        if self.fail_edits {
            return Err(DomainError::Unexpected("message to edit not found".into()));
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(TransportCall::Answer {
            callback_id: callback_id.to_owned(),
        });
        Ok(())
    }
}
