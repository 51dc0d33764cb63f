// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user multi-step conversation state.
//!
//! A user has at most one pending continuation at a time; setting a new
//! one replaces whatever was pending before. Continuations carry their
//! data inline instead of a side map, so taking one yields everything the
//! handler needs.

use dashmap::DashMap;

use nimbus_core::Jid;

/// What the bot is waiting for from a user.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// Waiting for a phone number to push `amount` to.
    StkPhone { amount: f64 },
    /// Waiting for a custom payment amount.
    StkAmount,
    /// Waiting for a transaction reference to look up.
    TxReference,
    /// Waiting for the custom message to send with a group tag blast.
    CustomTagMessage { participants: Vec<Jid> },
}

/// Keyed store of pending continuations, one slot per user.
#[derive(Default)]
pub struct UserStateStore {
    states: DashMap<Jid, Pending>,
}

impl UserStateStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Set the pending continuation for a user, replacing any existing one.
    pub fn set(&self, user: &Jid, pending: Pending) {
        self.states.insert(user.clone(), pending);
    }

    /// Remove and return the user's pending continuation.
    pub fn take(&self, user: &Jid) -> Option<Pending> {
        self.states.remove(user).map(|(_, pending)| pending)
    }

    /// Look at the user's pending continuation without consuming it.
    pub fn get(&self, user: &Jid) -> Option<Pending> {
        self.states.get(user).map(|entry| entry.value().clone())
    }

    /// Drop the user's pending continuation, if any.
    pub fn clear_user(&self, user: &Jid) -> bool {
        self.states.remove(user).is_some()
    }

    /// Drop every pending continuation (session stop).
    pub fn clear(&self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
