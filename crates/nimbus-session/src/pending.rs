// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staged per-sender action data awaiting a button choice.
//!
//! Commands like the contact exporter analyze something up front, offer
//! buttons, and only act when one is clicked. The analysis result is
//! staged here keyed by sender, one slot per sender, and consumed by the
//! button handler.

use dashmap::DashMap;

use nimbus_core::{GroupMetadata, Jid, MediaRef};

/// Data staged between a command and its follow-up button click.
#[derive(Debug, Clone)]
pub enum StagedAction {
    /// Group analyzed for a contact export, awaiting format choice.
    GroupExport { metadata: GroupMetadata },
    /// Group analyzed for a tag blast, awaiting target choice.
    GroupTag { metadata: GroupMetadata },
    /// Quoted media awaiting a hosting-service choice.
    Upload { media: MediaRef },
    /// Quoted media downloaded by the viewer, awaiting an action.
    MediaView { media: MediaRef, bytes: Vec<u8> },
}

/// Keyed cache of staged actions, one slot per sender.
#[derive(Default)]
pub struct PendingActionCache {
    staged: DashMap<Jid, StagedAction>,
}

impl PendingActionCache {
    pub fn new() -> Self {
        Self {
            staged: DashMap::new(),
        }
    }

    /// Stage an action for a sender, replacing any previous one.
    pub fn stage(&self, sender: &Jid, action: StagedAction) {
        self.staged.insert(sender.clone(), action);
    }

    /// Look at the sender's staged action without consuming it.
    pub fn get(&self, sender: &Jid) -> Option<StagedAction> {
        self.staged.get(sender).map(|entry| entry.value().clone())
    }

    /// Remove and return the sender's staged action.
    pub fn take(&self, sender: &Jid) -> Option<StagedAction> {
        self.staged.remove(sender).map(|(_, action)| action)
    }

    /// Discard the sender's staged action (cancel buttons).
    pub fn cancel(&self, sender: &Jid) -> bool {
        self.staged.remove(sender).is_some()
    }

    /// Drop everything (session stop).
    pub fn clear(&self) {
        self.staged.clear();
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::MediaKind;

    fn media() -> MediaRef {
        MediaRef {
            kind: MediaKind::Image,
            caption: None,
            size_bytes: Some(1024),
            width: None,
            height: None,
            seconds: None,
            url: None,
        }
    }

    #[test]
    fn staging_replaces_previous_action() {
        let cache = PendingActionCache::new();
        let sender = Jid::new("254712345678@s.whatsapp.net");

        cache.stage(&sender, StagedAction::Upload { media: media() });
        cache.stage(
            &sender,
            StagedAction::MediaView {
                media: media(),
                bytes: vec![1, 2, 3],
            },
        );

        assert_eq!(cache.len(), 1);
        match cache.take(&sender) {
            Some(StagedAction::MediaView { bytes, .. }) => assert_eq!(bytes, vec![1, 2, 3]),
            other => panic!("expected MediaView, got {other:?}"),
        }
    }

    #[test]
    fn cancel_reports_whether_anything_was_staged() {
        let cache = PendingActionCache::new();
        let sender = Jid::new("254712345678@s.whatsapp.net");

        assert!(!cache.cancel(&sender));
        cache.stage(&sender, StagedAction::Upload { media: media() });
        assert!(cache.cancel(&sender));
        assert!(cache.is_empty());
    }
}
