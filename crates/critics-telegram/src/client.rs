//! Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use critics_core::error::DomainError;
use critics_core::transport::{Button, ChatTransport};

use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, File, GetFileRequest,
    GetUpdatesRequest, InlineKeyboardMarkup, Message, SendMessageRequest, Update, User,
};

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Update kinds the bot subscribes to.
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Slack on top of the long-poll timeout before a request is abandoned.
const REQUEST_SLACK: Duration = Duration::from_secs(15);

/// Thin client over the Bot API's JSON methods.
///
/// Not `Debug`: the base URLs embed the bot token.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    method_base: String,
    file_base: String,
}

impl TelegramClient {
    /// Creates a client for `token` against `api_url`. Requests time out
    /// `poll_timeout` plus some slack after they are sent, so long polls are
    /// never cut short.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError::Transport` if the HTTP client cannot be built.
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .build()?;
        let api_url = api_url.trim_end_matches('/');
        Ok(Self {
            client,
            method_base: format!("{api_url}/bot{token}"),
            file_base: format!("{api_url}/file/bot{token}"),
        })
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.method_base))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.ok {
            return Err(TelegramError::Api {
                method,
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i32::from(status.as_u16())),
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or(TelegramError::MissingResult(method))
    }

    /// The bot's own account, used to validate the token at startup.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError` if the call fails or the token is rejected.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for updates after `offset`, waiting up to `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError` if the call fails.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &request).await
    }

    /// Downloads the file behind `file_id`.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError` if the file cannot be resolved or fetched.
    #[instrument(skip(self))]
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        let file: File = self.call("getFile", &GetFileRequest { file_id }).await?;
        let path = file
            .file_path
            .ok_or_else(|| TelegramError::MissingFilePath(file.file_id.clone()))?;

        let response = self
            .client
            .get(format!("{}/{path}", self.file_base))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Download(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        debug!(len = bytes.len(), "file downloaded");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: InlineKeyboardMarkup::from_buttons(buttons),
        };
        let _: Message = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        let request = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
            reply_markup: InlineKeyboardMarkup::from_buttons(buttons),
        };
        // The result is the edited message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &request).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), DomainError> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: callback_id,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }
}
