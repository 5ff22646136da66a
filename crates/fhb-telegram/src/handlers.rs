//! Telegram update handlers.
//!
//! Maps a teloxide `Message` to the transport-neutral `IncomingMessage` and
//! hands it to the conversation engine.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{MessageEntity, MessageEntityKind},
};
use tracing::warn;

use fhb_core::{
    domain::ChatId,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{EntityKind, IncomingMessage},
    },
};

use crate::router::AppState;

/// Sent when Reddit (or Telegram itself) fails mid-conversation.
pub const UNAVAILABLE_NOTICE: &str = "Reddit could not be reached. Please try again later.";

pub fn entity_kinds(entities: Option<&[MessageEntity]>) -> Vec<EntityKind> {
    entities
        .unwrap_or_default()
        .iter()
        .map(|e| match e.kind {
            MessageEntityKind::BotCommand => EntityKind::BotCommand,
            _ => EntityKind::Other,
        })
        .collect()
}

pub fn incoming_from(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        chat_id: ChatId(msg.chat.id.0),
        text: msg.text().map(str::to_string),
        entities: entity_kinds(msg.entities()),
    }
}

/// Collaborator failures are logged and the update dropped (no retry).
pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let incoming = incoming_from(&msg);

    if let Err(e) = state
        .engine
        .handle(&incoming, state.messenger.as_ref())
        .await
    {
        warn!(chat_id = %incoming.chat_id, error = %e, "failed to handle message");
        report_failure(state.messenger.as_ref(), incoming.chat_id, &e).await;
    }

    Ok(())
}

/// Tell the user about a collaborator failure. Returns whether a notice went out.
pub async fn report_failure(messenger: &dyn MessagingPort, chat_id: ChatId, err: &Error) -> bool {
    if !err.is_collaborator_failure() {
        return false;
    }
    match messenger.send_html(chat_id, UNAVAILABLE_NOTICE).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%chat_id, error = %e, "failed to send unavailable notice");
            false
        }
    }
}
