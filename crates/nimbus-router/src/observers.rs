// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction observers: auto-react to chat messages and status updates.
//!
//! Both are fire-and-forget side effects around classification. Their
//! failures are swallowed and can never affect command dispatch.

use rand::seq::SliceRandom;
use tracing::debug;

use nimbus_core::{InboundEvent, Jid, OutboundPayload, ProtocolClient, SendOptions};

/// Emojis used for the auto-react feature on regular chat messages.
pub const CHAT_EMOJIS: &[&str] = &[
    "❤️", "😂", "😮", "😢", "👏", "🔥", "⭐", "🎉", "👍", "👎", "😍", "🤔", "😎", "🥳", "🤯", "😱",
];

/// Emojis used when auto-liking status updates.
pub const STATUS_EMOJIS: &[&str] = &[
    "🦖", "💸", "💨", "🦮", "🐕‍🦺", "💯", "🔥", "💫", "💎", "⚡", "🤍", "🖤", "👀", "🙌", "🙆",
    "🚩", "💻", "🤖", "😎", "🤎", "✅", "🫀", "🧡", "😁", "😄", "🔔", "👌", "💥", "⛅", "🌟",
    "🗿", "🇵🇰", "💜", "💙", "🌝", "💚",
];

fn pick(set: &[&str]) -> String {
    set.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("👍")
        .to_string()
}

/// React to a regular chat message with a random emoji.
pub async fn react_to_message(event: &InboundEvent, socket: &dyn ProtocolClient) {
    let emoji = pick(CHAT_EMOJIS);
    let result = socket
        .send(
            &event.from,
            OutboundPayload::Reaction {
                emoji: emoji.clone(),
                key: event.key.clone(),
            },
            SendOptions::default(),
        )
        .await;
    if result.is_ok() {
        debug!(%emoji, chat = %event.from, "auto-reacted to message");
    }
}

/// Like a status update with a random emoji.
///
/// Status reactions must name the jids allowed to see them, so the send
/// carries a `status_jid_list` of the poster and ourselves.
pub async fn react_to_status(event: &InboundEvent, socket: &dyn ProtocolClient, self_jid: &Jid) {
    let emoji = pick(STATUS_EMOJIS);
    let mut status_jid_list = Vec::new();
    if let Some(participant) = &event.key.participant {
        status_jid_list.push(participant.clone());
    }
    status_jid_list.push(self_jid.clone());

    let result = socket
        .send(
            &event.from,
            OutboundPayload::Reaction {
                emoji: emoji.clone(),
                key: event.key.clone(),
            },
            SendOptions {
                status_jid_list,
                ..SendOptions::default()
            },
        )
        .await;
    if result.is_ok() {
        debug!(%emoji, "auto-liked a status update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_returns_member_of_set() {
        for _ in 0..32 {
            let emoji = pick(CHAT_EMOJIS);
            assert!(CHAT_EMOJIS.contains(&emoji.as_str()));
        }
    }

    #[test]
    fn emoji_sets_are_distinct_and_nonempty() {
        assert_eq!(CHAT_EMOJIS.len(), 16);
        assert_eq!(STATUS_EMOJIS.len(), 36);
    }
}
