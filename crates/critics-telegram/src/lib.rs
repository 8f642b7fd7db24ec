//! TV critics bot — Telegram adapter.
//!
//! Speaks the Telegram Bot API over HTTPS: long-polls for updates, turns
//! them into dialog events, and implements the chat transport the dialog's
//! gateway renders prompts through.

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod types;
pub mod updates;
