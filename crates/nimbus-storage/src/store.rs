// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`SessionStore`] trait.
//!
//! Credentials are stored as a JSON blob per session id. `save` is an
//! upsert that also refreshes `updated_at`, which the TTL sweep uses as
//! the idle clock.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rusqlite::params;
use tracing::debug;

use nimbus_core::{Credentials, NimbusError, SessionId, SessionStore};

use crate::database::{map_tr_err, Database};

/// SQLite-backed session store.
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    /// Open (or create) the store at the given database path.
    pub async fn open(path: &str) -> Result<Self, NimbusError> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    /// Ids of every persisted session, newest first.
    pub async fn list_ids(&self) -> Result<Vec<SessionId>, NimbusError> {
        self.db
            .connection()
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id FROM sessions ORDER BY updated_at DESC")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ids)
            })
            .await
            .map_err(map_tr_err)
            .map(|ids| ids.into_iter().map(SessionId).collect())
    }

    /// Delete sessions idle longer than `ttl_days`. Returns the number
    /// of sessions purged.
    pub async fn purge_expired(&self, ttl_days: u32) -> Result<usize, NimbusError> {
        let cutoff = (Utc::now() - Duration::days(i64::from(ttl_days))).to_rfc3339();
        let purged = self
            .db
            .connection()
            .call(move |conn| {
                let purged =
                    conn.execute("DELETE FROM sessions WHERE updated_at < ?1", params![cutoff])?;
                Ok(purged)
            })
            .await
            .map_err(map_tr_err)?;
        if purged > 0 {
            debug!(purged, ttl_days, "purged expired sessions");
        }
        Ok(purged)
    }

    /// Checkpoint and release the database.
    pub async fn close(&self) -> Result<(), NimbusError> {
        self.db.close().await
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Credentials>, NimbusError> {
        let id = id.0.clone();
        let blob = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT credentials FROM sessions WHERE id = ?1")?;
                let result = stmt.query_row(params![id], |row| row.get::<_, String>(0));
                match result {
                    Ok(blob) => Ok(Some(blob)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(map_tr_err)?;

        match blob {
            Some(blob) => {
                let credentials =
                    serde_json::from_str(&blob).map_err(|e| NimbusError::Storage {
                        source: Box::new(e),
                    })?;
                Ok(Some(credentials))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &SessionId, credentials: &Credentials) -> Result<(), NimbusError> {
        let id = id.0.clone();
        let blob = serde_json::to_string(credentials).map_err(|e| NimbusError::Storage {
            source: Box::new(e),
        })?;
        let now = Utc::now().to_rfc3339();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sessions (id, credentials, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)
                     ON CONFLICT(id) DO UPDATE SET
                         credentials = excluded.credentials,
                         updated_at = excluded.updated_at",
                    params![id, blob, now],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, NimbusError> {
        let id = id.0.clone();
        let removed = self
            .db
            .connection()
            .call(move |conn| {
                let removed = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_err)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn open_temp_store() -> (tempfile::TempDir, SqliteSessionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sessions.db");
        let store = SqliteSessionStore::open(path.to_str().unwrap())
            .await
            .expect("open store");
        (dir, store)
    }

    fn sample_credentials() -> Credentials {
        Credentials {
            creds: json!({"noise_key": "abc", "registered": true}),
            keys: json!({"pre_keys": {"1": "k1"}}),
        }
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let (_dir, store) = open_temp_store().await;
        let id = SessionId("nimbus-1".into());
        let creds = sample_credentials();

        store.save(&id, &creds).await.expect("save");
        let loaded = store.get(&id).await.expect("get").expect("present");
        assert_eq!(loaded, creds);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_dir, store) = open_temp_store().await;
        let loaded = store.get(&SessionId("absent".into())).await.expect("get");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let (_dir, store) = open_temp_store().await;
        let id = SessionId("nimbus-1".into());

        store.save(&id, &sample_credentials()).await.expect("save");
        let rotated = Credentials {
            creds: json!({"noise_key": "rotated"}),
            keys: json!({}),
        };
        store.save(&id, &rotated).await.expect("second save");

        let loaded = store.get(&id).await.expect("get").expect("present");
        assert_eq!(loaded, rotated);
        assert_eq!(store.list_ids().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let (_dir, store) = open_temp_store().await;
        let id = SessionId("nimbus-1".into());
        store.save(&id, &sample_credentials()).await.expect("save");

        assert!(store.delete(&id).await.expect("delete"));
        assert!(!store.delete(&id).await.expect("second delete"));
        assert!(store.get(&id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn purge_expired_only_removes_stale_sessions() {
        let (_dir, store) = open_temp_store().await;
        let fresh = SessionId("fresh".into());
        store.save(&fresh, &sample_credentials()).await.expect("save");

        // Backdate a second session past the TTL cutoff.
        let stale_updated = (Utc::now() - Duration::days(30)).to_rfc3339();
        store
            .db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sessions (id, credentials, created_at, updated_at)
                     VALUES ('stale', '{\"creds\":null,\"keys\":null}', ?1, ?1)",
                    params![stale_updated],
                )?;
                Ok(())
            })
            .await
            .expect("insert stale");

        let purged = store.purge_expired(7).await.expect("purge");
        assert_eq!(purged, 1);
        assert!(store.get(&fresh).await.expect("get").is_some());
        assert!(store.get(&SessionId("stale".into())).await.expect("get").is_none());
    }
}
