use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ChatId;

/// One async mutex per chat, so messages of a chat are handled one at a time.
///
/// Entries are never removed, matching the session store lifetime.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_chat_waits_for_release() {
        let locks = Arc::new(ChatLocks::default());
        let guard = locks.lock_chat(ChatId(1)).await;

        let locks2 = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = locks2.lock_chat(ChatId(1)).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finishes")
            .expect("task ok");
    }

    #[tokio::test]
    async fn different_chats_do_not_block() {
        let locks = ChatLocks::default();
        let _a = locks.lock_chat(ChatId(1)).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock_chat(ChatId(2))).await;
        assert!(b.is_ok());
    }
}
