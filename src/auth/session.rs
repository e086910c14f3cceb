use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

struct Entry {
    user_id: i64,
    issued_at: Instant,
}

/// Process-wide session table: opaque token -> user id, entries expire
/// after `ttl`. Expired entries are pruned on access; there is no
/// background sweeper.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh token for `user_id`.
    pub fn open(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.inner.lock().unwrap();
        sessions.insert(
            token.clone(),
            Entry {
                user_id,
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// Resolve a token to its user id, dropping any expired entries.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        let mut sessions = self.inner.lock().unwrap();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.issued_at.elapsed() < ttl);
        sessions.get(token).map(|entry| entry.user_id)
    }

    pub fn revoke(&self, token: &str) {
        self.inner.lock().unwrap().remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_resolve() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.open(7);
        assert_eq!(store.resolve(&token), Some(7));
        assert_eq!(store.resolve("unknown"), None);
    }

    #[test]
    fn revoked_tokens_stop_resolving() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.open(7);
        store.revoke(&token);
        assert_eq!(store.resolve(&token), None);
    }

    #[test]
    fn expired_tokens_are_pruned() {
        let store = SessionStore::new(Duration::from_millis(1));
        let token = store.open(7);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.resolve(&token), None);
    }
}
