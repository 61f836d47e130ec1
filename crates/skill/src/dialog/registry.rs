//! Process-wide session registry.
//!
//! Sessions live in a bounded `moka` cache keyed by conversation identity.
//! Idle sessions are evicted after the configured time-to-idle; the oldest
//! are dropped once capacity is reached.

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::Mutex;

use super::state::Session;
use crate::config::SessionConfig;

/// A session shared between overlapping turns of the same conversation.
pub type SharedSession = Arc<Mutex<Session>>;

/// Concurrent get-or-create map from conversation identity to session.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<String, SharedSession>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(config.idle_timeout)
            .build();
        Self { sessions }
    }

    /// The session for `id`, created in `Idle` on first contact.
    ///
    /// Concurrent callers for the same id receive the same session.
    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        self.sessions
            .get_with_by_ref(id, async { Arc::new(Mutex::new(Session::new())) })
            .await
    }

    /// Forget a session; the next turn starts over in `Idle`.
    pub async fn remove(&self, id: &str) {
        self.sessions.invalidate(id).await;
    }

    /// Number of live sessions after pending evictions are applied.
    pub async fn len(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dialog::state::DialogState;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(&SessionConfig {
            capacity: 100,
            idle_timeout: Duration::from_secs(60),
        })
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let registry = registry();
        let first = registry.get_or_create("user-1").await;
        first.lock().await.state = DialogState::AddingAccount;

        let second = registry.get_or_create("user-1").await;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(second.lock().await.state, DialogState::AddingAccount));
    }

    #[tokio::test]
    async fn test_sessions_are_per_identity() {
        let registry = registry();
        let a = registry.get_or_create("a").await;
        let b = registry.get_or_create("b").await;
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_starts_over() {
        let registry = registry();
        registry.get_or_create("user-1").await.lock().await.state = DialogState::Ended;
        registry.remove("user-1").await;

        let session = registry.get_or_create("user-1").await;
        assert!(matches!(session.lock().await.state, DialogState::Idle));
    }

    #[tokio::test]
    async fn test_empty_registry() {
        assert!(registry().is_empty().await);
    }
}
