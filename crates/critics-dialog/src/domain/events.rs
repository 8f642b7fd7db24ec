//! Inbound events, outbound prompts and button payloads.

use critics_core::transport::Button;

use super::records::UserId;

/// Button payload for the critics branch of the main menu.
pub const CRITICS_BUTTON: &str = "menu:critics";
/// Button payload for the game branch of the main menu.
pub const GAME_BUTTON: &str = "menu:game";
/// Button payload that cancels the current flow.
pub const CANCEL_BUTTON: &str = "cancel";
/// Prefix of program selection payloads; the suffix is the catalog index.
pub const PROGRAM_BUTTON_PREFIX: &str = "program:";

/// Payload for the program at `index`.
#[must_use]
pub fn program_button_payload(index: usize) -> String {
    format!("{PROGRAM_BUTTON_PREFIX}{index}")
}

/// A recorded voice message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceClip {
    /// Duration reported by the platform.
    pub duration_seconds: u32,
    /// Downloaded audio bytes.
    pub bytes: Vec<u8>,
    /// Caption typed alongside the recording, if any.
    pub caption: Option<String>,
}

/// Something a user did, abstracted from the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A slash command, without the slash (`start`, `cancel`).
    Command(String),
    /// A keyboard button press carrying its payload token.
    ButtonPress(String),
    /// A typed message.
    TextMessage(String),
    /// A voice message.
    VoicePayload(VoiceClip),
    /// A message the bot does not understand (photo, sticker, ...).
    Unsupported(String),
}

impl InboundEvent {
    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::ButtonPress(_) => "button_press",
            Self::TextMessage(_) => "text_message",
            Self::VoicePayload(_) => "voice_payload",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

/// Decoded meaning of a button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Main menu: critics.
    Critics,
    /// Main menu: game registration.
    Game,
    /// Cancel the current flow.
    Cancel,
    /// A program selection; the raw index text is validated later.
    Program(String),
    /// Anything else.
    Unknown(String),
}

impl ButtonAction {
    /// Decodes a payload token.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        match payload {
            CRITICS_BUTTON => Self::Critics,
            GAME_BUTTON => Self::Game,
            CANCEL_BUTTON => Self::Cancel,
            other => match other.strip_prefix(PROGRAM_BUTTON_PREFIX) {
                Some(index) => Self::Program(index.to_owned()),
                None => Self::Unknown(other.to_owned()),
            },
        }
    }
}

/// What the bot says back: text plus an optional keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Message text.
    pub text: String,
    /// Keyboard buttons, one per row.
    pub buttons: Vec<Button>,
}

impl Prompt {
    /// A prompt with no keyboard.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// A prompt with a keyboard.
    #[must_use]
    pub fn with_buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            buttons,
        }
    }
}

/// How the triggering event reached the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A typed or recorded message.
    Message,
    /// A press on a keyboard attached to `message_id`.
    Button {
        /// Callback id to acknowledge.
        callback_id: String,
        /// The message that carries the pressed keyboard.
        message_id: i64,
    },
}

/// Addressing for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    /// The user whose session this turn runs against.
    pub user_id: UserId,
    /// Chat that replies go to.
    pub chat_id: i64,
    /// How the event arrived.
    pub origin: Origin,
}

impl TurnContext {
    /// Context for a typed message in a private chat.
    #[must_use]
    pub fn message(user_id: UserId, chat_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            origin: Origin::Message,
        }
    }

    /// Context for a button press.
    #[must_use]
    pub fn button(
        user_id: UserId,
        chat_id: i64,
        callback_id: impl Into<String>,
        message_id: i64,
    ) -> Self {
        Self {
            user_id,
            chat_id,
            origin: Origin::Button {
                callback_id: callback_id.into(),
                message_id,
            },
        }
    }
}
