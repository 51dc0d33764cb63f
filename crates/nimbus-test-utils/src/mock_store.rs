// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`SessionStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use nimbus_core::{Credentials, NimbusError, SessionId, SessionStore};

/// An in-memory credentials store with failure injection.
pub struct MockSessionStore {
    sessions: Mutex<HashMap<SessionId, Credentials>>,
    fail_ops: AtomicBool,
    save_count: AtomicUsize,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            fail_ops: AtomicBool::new(false),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Seed the store with existing credentials.
    pub async fn seed(&self, id: &SessionId, credentials: Credentials) {
        self.sessions.lock().await.insert(id.clone(), credentials);
    }

    /// Make every subsequent operation fail.
    pub fn fail_ops(&self, fail: bool) {
        self.fail_ops.store(fail, Ordering::SeqCst);
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.lock().await.contains_key(id)
    }

    fn check(&self) -> Result<(), NimbusError> {
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(NimbusError::Storage {
                source: Box::new(std::io::Error::other("mock store failure")),
            });
        }
        Ok(())
    }
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Credentials>, NimbusError> {
        self.check()?;
        Ok(self.sessions.lock().await.get(id).cloned())
    }

    async fn save(&self, id: &SessionId, credentials: &Credentials) -> Result<(), NimbusError> {
        self.check()?;
        self.save_count.fetch_add(1, Ordering::SeqCst);
        self.sessions
            .lock()
            .await
            .insert(id.clone(), credentials.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, NimbusError> {
        self.check()?;
        Ok(self.sessions.lock().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_get_delete_round_trip() {
        let store = MockSessionStore::new();
        let id = SessionId("s1".into());
        let creds = Credentials::empty();

        assert!(store.get(&id).await.unwrap().is_none());
        store.save(&id, &creds).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.save_count(), 1);
        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = MockSessionStore::new();
        store.fail_ops(true);
        let id = SessionId("s1".into());
        assert!(store.get(&id).await.is_err());
    }
}
