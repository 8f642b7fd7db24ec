//! Translation of Bot API updates into dialog events.

use critics_dialog::domain::events::{InboundEvent, TurnContext};

use crate::types::{CallbackQuery, Message, Update};

/// What an update asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// An event that can be handed to the conversation as is.
    Ready {
        ctx: TurnContext,
        event: InboundEvent,
    },
    /// A voice message whose audio still has to be downloaded.
    Voice {
        ctx: TurnContext,
        file_id: String,
        duration_seconds: u32,
        caption: Option<String>,
    },
}

impl Inbound {
    /// The addressing of the turn this update starts.
    #[must_use]
    pub fn context(&self) -> &TurnContext {
        match self {
            Self::Ready { ctx, .. } | Self::Voice { ctx, .. } => ctx,
        }
    }
}

/// Normalizes `/Start@CriticsBot now` to `start`. Returns `None` for text
/// that is not a command.
#[must_use]
pub fn command_name(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('/')?;
    let word = rest.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}

/// Classifies an update. Updates the bot does not serve (edited messages,
/// channel posts, messages from other bots) yield `None`.
#[must_use]
pub fn classify(update: Update) -> Option<Inbound> {
    if let Some(query) = update.callback_query {
        return Some(from_callback(query));
    }
    update.message.and_then(from_message)
}

fn from_callback(query: CallbackQuery) -> Inbound {
    let (chat_id, message_id) = query
        .message
        .as_ref()
        .map_or((query.from.id, 0), |m| (m.chat.id, m.message_id));
    Inbound::Ready {
        ctx: TurnContext::button(query.from.id, chat_id, query.id, message_id),
        event: InboundEvent::ButtonPress(query.data.unwrap_or_default()),
    }
}

fn from_message(message: Message) -> Option<Inbound> {
    let from = message.from.as_ref()?;
    if from.is_bot {
        return None;
    }
    let ctx = TurnContext::message(from.id, message.chat.id);

    if let Some(voice) = message.voice {
        return Some(Inbound::Voice {
            ctx,
            file_id: voice.file_id,
            duration_seconds: voice.duration,
            caption: message.caption,
        });
    }
    let event = match message.text {
        Some(text) => match command_name(&text) {
            Some(name) => InboundEvent::Command(name),
            None => InboundEvent::TextMessage(text),
        },
        None => InboundEvent::Unsupported(message.media_kind().to_owned()),
    };
    Some(Inbound::Ready { ctx, event })
}
