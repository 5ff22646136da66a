use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatId, Command};

/// Per-chat conversation state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Most recent command of this chat; `Start` on first contact.
    pub last_command: Command,
    /// References shown by the last `/posts`, in display order.
    pub last_listing: Vec<String>,
}

impl Session {
    /// Reference at a 1-based listing position.
    pub fn listing_reference(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.last_listing.get(i))
            .map(String::as_str)
    }
}

/// Keyed session storage.
///
/// Sessions are never deleted: one entry per chat for the process lifetime.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Option<Session>;

    /// Existing session, or a fresh default one (inserted before returning).
    async fn get_or_create(&self, chat_id: ChatId) -> Session;

    async fn upsert(&self, chat_id: ChatId, session: Session);
}

/// Process-memory session store. State is lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: ChatId) -> Option<Session> {
        self.sessions.lock().await.get(&chat_id).cloned()
    }

    async fn get_or_create(&self, chat_id: ChatId) -> Session {
        let mut map = self.sessions.lock().await;
        map.entry(chat_id).or_default().clone()
    }

    async fn upsert(&self, chat_id: ChatId, session: Session) {
        self.sessions.lock().await.insert(chat_id, session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_default_session_on_first_contact() {
        let store = InMemorySessionStore::new();
        assert!(store.get(ChatId(7)).await.is_none());

        let s = store.get_or_create(ChatId(7)).await;
        assert_eq!(s.last_command, Command::Start);
        assert!(s.last_listing.is_empty());
        assert_eq!(store.get(ChatId(7)).await, Some(Session::default()));
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_chat() {
        let store = InMemorySessionStore::new();
        store
            .upsert(
                ChatId(1),
                Session {
                    last_command: Command::Posts,
                    last_listing: vec!["a".to_string()],
                },
            )
            .await;

        let other = store.get_or_create(ChatId(2)).await;
        assert_eq!(other, Session::default());
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn listing_reference_is_one_based() {
        let s = Session {
            last_command: Command::Posts,
            last_listing: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(s.listing_reference(0), None);
        assert_eq!(s.listing_reference(1), Some("a"));
        assert_eq!(s.listing_reference(2), Some("b"));
        assert_eq!(s.listing_reference(3), None);
    }
}
