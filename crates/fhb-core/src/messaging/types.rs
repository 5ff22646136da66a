use crate::domain::ChatId;

/// Transport-neutral inbound message.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// `None` for updates without text (stickers, photos, joins...).
    pub text: Option<String>,
    /// Entity markers attached to the text, in message order.
    pub entities: Vec<EntityKind>,
}

impl IncomingMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
            entities: Vec::new(),
        }
    }

    pub fn command(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
            entities: vec![EntityKind::BotCommand],
        }
    }

    /// A message is a command if it starts with `/` and its first entity is a bot command.
    pub fn is_command(&self) -> bool {
        let Some(text) = &self.text else {
            return false;
        };
        text.starts_with('/') && self.entities.first() == Some(&EntityKind::BotCommand)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    BotCommand,
    Other,
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}
