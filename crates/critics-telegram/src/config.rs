//! Bot configuration read from the environment.

use std::path::PathBuf;

use critics_dialog::application::conversation::DEFAULT_IDLE_TIMEOUT_MINUTES;
use critics_dialog::domain::programs::ProgramCatalog;

use crate::client::DEFAULT_API_URL;
use crate::error::AppError;

/// Everything the bot binary needs to start. Not `Debug`, so the token
/// cannot end up in a log line.
#[derive(Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub elasticsearch_host: String,
    pub elasticsearch_port: u16,
    pub assets_dir: PathBuf,
    pub session_idle: chrono::Duration,
    pub programs: ProgramCatalog,
}

impl BotConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `TELEGRAM_BOT_TOKEN` is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`BotConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let telegram_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("TELEGRAM_BOT_TOKEN environment variable must be set".to_owned())
            })?;
        let telegram_api_url =
            lookup("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let elasticsearch_host =
            lookup("ELASTICSEARCH_HOST").unwrap_or_else(|| "localhost".to_owned());
        let elasticsearch_port: u16 = lookup("ELASTICSEARCH_PORT")
            .unwrap_or_else(|| "9200".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("ELASTICSEARCH_PORT must be a valid u16: {e}")))?;
        let assets_dir = PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_owned()));
        let idle_minutes: i64 = match lookup("SESSION_IDLE_MINUTES") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("SESSION_IDLE_MINUTES must be an integer: {e}"))
            })?,
            None => DEFAULT_IDLE_TIMEOUT_MINUTES,
        };
        if idle_minutes <= 0 {
            return Err(AppError::Config(
                "SESSION_IDLE_MINUTES must be positive".to_owned(),
            ));
        }
        let session_idle = chrono::Duration::try_minutes(idle_minutes).ok_or_else(|| {
            AppError::Config(format!("SESSION_IDLE_MINUTES is out of range: {idle_minutes}"))
        })?;
        let programs = match lookup("TV_PROGRAMS") {
            Some(list) => ProgramCatalog::parse(&list)
                .map_err(|e| AppError::Config(format!("TV_PROGRAMS: {e}")))?,
            None => ProgramCatalog::default(),
        };

        Ok(Self {
            telegram_token,
            telegram_api_url,
            elasticsearch_host,
            elasticsearch_port,
            assets_dir,
            session_idle,
            programs,
        })
    }
}
