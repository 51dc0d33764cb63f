// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store trait: persists credential blobs keyed by session id.

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::types::{Credentials, SessionId};

/// Persistent key-value store for session credentials.
///
/// TTL expiry is a store-level concern; implementations are expected to
/// expire sessions after a configured number of idle days.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the persisted credentials for a session, if any.
    async fn get(&self, id: &SessionId) -> Result<Option<Credentials>, NimbusError>;

    /// Persist (insert or replace) the credentials for a session.
    async fn save(&self, id: &SessionId, credentials: &Credentials) -> Result<(), NimbusError>;

    /// Delete a session's credentials. Returns whether anything was removed.
    async fn delete(&self, id: &SessionId) -> Result<bool, NimbusError>;
}
