//! Per-chat session registry
//!
//! Sessions are created on first contact and dropped on logout. Each one sits
//! behind its own async mutex, so a slow API call in one chat never holds up
//! another. Nothing is persisted; a restart forgets every conversation.

use crate::flow::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<i64, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `chat_id`, created fresh if this chat has not been seen.
    pub async fn get_or_create(&self, chat_id: i64) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(&chat_id) {
            return session.clone();
        }

        self.sessions
            .write()
            .await
            .entry(chat_id)
            .or_insert_with(|| {
                debug!("[Sessions] New session for chat {}", chat_id);
                Arc::new(Mutex::new(Session::default()))
            })
            .clone()
    }

    /// Forget `chat_id` entirely. Returns whether a session existed.
    pub async fn remove(&self, chat_id: i64) -> bool {
        let removed = self.sessions.write().await.remove(&chat_id).is_some();
        if removed {
            debug!("[Sessions] Dropped session for chat {}", chat_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ConversationState;

    #[tokio::test]
    async fn test_same_chat_shares_a_session() {
        let registry = SessionRegistry::new();

        let a = registry.get_or_create(1).await;
        a.lock().await.state = ConversationState::AddTask;

        let again = registry.get_or_create(1).await;
        assert_eq!(again.lock().await.state, ConversationState::AddTask);
        assert!(Arc::ptr_eq(&a, &again));

        let other = registry.get_or_create(2).await;
        assert_eq!(other.lock().await.state, ConversationState::Idle);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_starts_over() {
        let registry = SessionRegistry::new();
        registry.get_or_create(7).await.lock().await.token = Some("t".into());

        assert!(registry.remove(7).await);
        assert!(!registry.remove(7).await);
        assert!(registry.is_empty().await);

        let fresh = registry.get_or_create(7).await;
        assert!(fresh.lock().await.token.is_none());
    }
}
