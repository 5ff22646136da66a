//! Conversation engine: turns single inbound messages into per-chat,
//! multi-turn interactions (`/posts` then a number, `/details` then a URL).

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, info};

use crate::{
    config::Config,
    domain::{ChatId, Command},
    errors::Error,
    formatting::{format_detail, format_listing, split_message},
    listing::{summarize, ItemDetail},
    locks::ChatLocks,
    messaging::{port::MessagingPort, types::IncomingMessage},
    ports::ContentSource,
    session::{Session, SessionStore},
    Result,
};

pub const URL_PROMPT: &str = "Please enter post URL.";
pub const INVALID_COMMAND: &str = "Please enter a valid bot command.";
pub const INVALID_NUMBER: &str = "Please enter a valid number.";
pub const INVALID_URL: &str = "Please enter a valid post URL.";

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Listing source (subreddit name).
    pub source_name: String,
    pub listing_limit: usize,
    /// Every acceptable post URL starts with this.
    pub reference_prefix: String,
    /// Bound applied to each collaborator call.
    pub call_timeout: Duration,
}

impl From<&Config> for EngineConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            source_name: cfg.subreddit.clone(),
            listing_limit: cfg.listing_limit,
            reference_prefix: cfg.reference_prefix(),
            call_timeout: cfg.collaborator_timeout,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Listing,
    UrlPrompt,
    Detail,
    InvalidNumber,
    InvalidUrl,
    InvalidCommand,
}

/// Text produced for one inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub struct ConversationEngine {
    cfg: EngineConfig,
    source: Arc<dyn ContentSource>,
    sessions: Arc<dyn SessionStore>,
    locks: ChatLocks,
}

impl ConversationEngine {
    pub fn new(
        cfg: EngineConfig,
        source: Arc<dyn ContentSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            cfg,
            source,
            sessions,
            locks: ChatLocks::default(),
        }
    }

    /// Process one inbound message end to end and send the reply, if any.
    ///
    /// Messages of the same chat are serialized. Collaborator failures are
    /// returned to the caller after the session has been written back.
    pub async fn handle(
        &self,
        msg: &IncomingMessage,
        messenger: &dyn MessagingPort,
    ) -> Result<Option<Reply>> {
        let _guard = self.locks.lock_chat(msg.chat_id).await;

        let reply = self.process(msg).await?;
        match &reply {
            Some(r) => {
                info!(chat_id = %msg.chat_id, reply = ?r.kind, "replying");
                self.deliver(msg.chat_id, &r.text, messenger).await?;
            }
            None => debug!(chat_id = %msg.chat_id, "no reply"),
        }
        Ok(reply)
    }

    async fn deliver(
        &self,
        chat_id: ChatId,
        text: &str,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let limit = messenger.capabilities().max_message_len;
        for chunk in split_message(text, limit) {
            bounded(
                "send message",
                self.cfg.call_timeout,
                messenger.send_html(chat_id, &chunk),
            )
            .await?;
        }
        Ok(())
    }

    /// State transition for one message. Callers must hold the chat lock.
    async fn process(&self, msg: &IncomingMessage) -> Result<Option<Reply>> {
        let Some(text) = msg.text.as_deref() else {
            debug!(chat_id = %msg.chat_id, "ignoring message without text");
            return Ok(None);
        };

        let mut session = self.sessions.get_or_create(msg.chat_id).await;

        let result = if msg.is_command() {
            let cmd = Command::parse(text);
            info!(chat_id = %msg.chat_id, command = cmd.name(), "command");
            self.on_command(&mut session, cmd).await
        } else {
            self.on_text(&session, text).await
        };

        // Written back on failure too: `/posts` keeps its cleared listing.
        self.sessions.upsert(msg.chat_id, session).await;
        result
    }

    async fn on_command(&self, session: &mut Session, cmd: Command) -> Result<Option<Reply>> {
        session.last_command = cmd.clone();

        match cmd {
            Command::Posts => {
                session.last_listing.clear();
                let entries = bounded(
                    "listing fetch",
                    self.cfg.call_timeout,
                    self.source
                        .fetch_recent(&self.cfg.source_name, self.cfg.listing_limit),
                )
                .await?;

                let items = summarize(entries);
                session.last_listing = items.iter().map(|i| i.reference.clone()).collect();
                Ok(Some(Reply::new(ReplyKind::Listing, format_listing(&items))))
            }
            Command::Details => Ok(Some(Reply::new(ReplyKind::UrlPrompt, URL_PROMPT))),
            Command::Start => Ok(None),
            Command::Unrecognized(_) => {
                Ok(Some(Reply::new(ReplyKind::InvalidCommand, INVALID_COMMAND)))
            }
        }
    }

    async fn on_text(&self, session: &Session, text: &str) -> Result<Option<Reply>> {
        match &session.last_command {
            Command::Posts => {
                let Some(reference) = parse_selection(text, session.last_listing.len())
                    .and_then(|n| session.listing_reference(n))
                else {
                    return Ok(Some(Reply::new(ReplyKind::InvalidNumber, INVALID_NUMBER)));
                };
                self.detail_reply(reference).await.map(Some)
            }
            Command::Details => {
                let candidate = text.trim();
                if !self.is_valid_reference(candidate).await? {
                    return Ok(Some(Reply::new(ReplyKind::InvalidUrl, INVALID_URL)));
                }
                self.detail_reply(candidate).await.map(Some)
            }
            // No free-text behaviour defined for these.
            Command::Start | Command::Unrecognized(_) => Ok(None),
        }
    }

    async fn is_valid_reference(&self, candidate: &str) -> Result<bool> {
        if !candidate.starts_with(&self.cfg.reference_prefix) {
            return Ok(false);
        }
        bounded(
            "url validation",
            self.cfg.call_timeout,
            self.source.validate(candidate),
        )
        .await
    }

    async fn detail_reply(&self, reference: &str) -> Result<Reply> {
        let post = bounded(
            "detail fetch",
            self.cfg.call_timeout,
            self.source.fetch_detail(reference),
        )
        .await?;
        Ok(Reply::new(
            ReplyKind::Detail,
            format_detail(&ItemDetail::from(post)),
        ))
    }
}

/// 1-based listing position, if `text` is an integer within `1..=len`.
pub fn parse_selection(text: &str, len: usize) -> Option<usize> {
    let n = text.trim().parse::<usize>().ok()?;
    (1..=len).contains(&n).then_some(n)
}

async fn bounded<T>(
    operation: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| Error::Timeout { operation, after })?
}
