use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::session::Session;

/// In-memory session map keyed by opaque caller-supplied ids. Each entry
/// hands out an `Arc<tokio::sync::Mutex<Session>>`: holding that lock is
/// what serializes two concurrent turns for the same session, while turns
/// for distinct sessions proceed independently. Sessions live until an
/// explicit remove; there is no expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the session for `id`, creating a fresh one on first
    /// reference. Ids are never generated here.
    pub fn checkout(&self, id: &str) -> Arc<tokio::sync::Mutex<Session>> {
        let mut sessions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            sessions
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Session::new()))),
        )
    }

    /// Drops the session; the next checkout for the same id starts a fresh
    /// booking. A turn already holding the old handle finishes against it
    /// harmlessly.
    pub fn remove(&self, id: &str) {
        let mut sessions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        let sessions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let sessions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::SessionStore;
    use crate::domain::session::Stage;

    #[tokio::test]
    async fn checkout_creates_lazily_and_returns_the_same_entry() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let first = store.checkout("table-1");
        let second = store.checkout("table-1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn removal_gives_the_next_checkout_a_fresh_booking() {
        let store = SessionStore::new();

        {
            let handle = store.checkout("table-2");
            let mut session = handle.lock().await;
            session.stage = Stage::Guests;
            session.booking.guests = 4;
        }

        store.remove("table-2");
        assert!(!store.contains("table-2"));

        let handle = store.checkout("table-2");
        let session = handle.lock().await;
        assert_eq!(session.stage, Stage::Init);
        assert_eq!(session.booking.guests, 0);
    }

    #[tokio::test]
    async fn distinct_ids_do_not_share_state() {
        let store = SessionStore::new();
        {
            let handle = store.checkout("a");
            handle.lock().await.booking.guests = 2;
        }
        let other = store.checkout("b");
        assert_eq!(other.lock().await.booking.guests, 0);
    }
}
