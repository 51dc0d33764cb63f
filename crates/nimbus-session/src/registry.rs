// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide registry of running bot sessions.

use std::sync::Arc;

use dashmap::DashMap;

use nimbus_core::SessionId;

use crate::supervisor::ConnectionSupervisor;

/// Registry mapping session ids to their running supervisors.
///
/// Register is last-write-wins: re-registering an id replaces the previous
/// entry, matching a restart of the same session.
#[derive(Default)]
pub struct BotSessionRegistry {
    sessions: DashMap<SessionId, Arc<ConnectionSupervisor>>,
}

impl BotSessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a supervisor under its session id, replacing any previous
    /// entry with the same id.
    pub fn insert(&self, supervisor: Arc<ConnectionSupervisor>) {
        self.sessions
            .insert(supervisor.session_id().clone(), supervisor);
    }

    /// Look up a running session.
    pub fn get(&self, id: &SessionId) -> Option<Arc<ConnectionSupervisor>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a session from the registry. Returns whether it was present.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Whether a session with this id is registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Ids of all registered sessions, sorted.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }

    /// All registered supervisors.
    pub fn all(&self) -> Vec<Arc<ConnectionSupervisor>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
