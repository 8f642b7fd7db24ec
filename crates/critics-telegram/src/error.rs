//! TV critics bot — error types.

use critics_core::error::DomainError;
use critics_storage::elasticsearch::EsError;
use thiserror::Error;

/// Failures talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The request could not be sent or the body not read. The URL, which
    /// embeds the bot token, is stripped before the error is stored.
    #[error("telegram request failed: {0}")]
    Transport(reqwest::Error),

    /// The API answered `ok: false`.
    #[error("telegram {method} failed ({code}): {description}")]
    Api {
        /// Bot API method name.
        method: &'static str,
        /// `error_code` from the response, or the HTTP status.
        code: i32,
        /// `description` from the response.
        description: String,
    },

    /// A successful response without a `result`.
    #[error("telegram {0} returned no result")]
    MissingResult(&'static str),

    /// `getFile` returned a file that cannot be downloaded.
    #[error("file {0} has no download path")]
    MissingFilePath(String),

    /// The file download answered with a non-success status.
    #[error("file download failed with status {0}")]
    Download(u16),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

impl From<TelegramError> for DomainError {
    fn from(e: TelegramError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

/// Startup errors for the bot binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store client construction or provisioning error.
    #[error("storage error: {0}")]
    Storage(#[from] EsError),

    /// The bot could not reach or authenticate against the Bot API.
    #[error("telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// I/O error while running.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}
