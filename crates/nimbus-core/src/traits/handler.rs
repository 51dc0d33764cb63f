// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command handler trait and the per-dispatch context passed to handlers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NimbusError;
use crate::traits::socket::ProtocolClient;
use crate::types::{InboundEvent, OutboundPayload, SendOptions};

/// Everything a handler needs to act on one dispatched event.
#[derive(Clone)]
pub struct CommandContext {
    pub event: InboundEvent,
    /// Command name with the prefix stripped, lowercased. Empty for
    /// button and continuation dispatches.
    pub command: String,
    /// Argument string after the command name, trimmed.
    pub args: String,
    pub socket: Arc<dyn ProtocolClient>,
}

impl CommandContext {
    /// Send a text reply into the originating chat, quoting the event.
    pub async fn reply(&self, text: impl Into<String>) -> Result<(), NimbusError> {
        self.socket
            .send(
                &self.event.from,
                OutboundPayload::Text { text: text.into() },
                SendOptions {
                    quoted: Some(self.event.key.clone()),
                    ..SendOptions::default()
                },
            )
            .await
    }

    /// Best-effort reaction on the originating message. Failures are
    /// swallowed; reactions never affect dispatch.
    pub async fn react(&self, emoji: &str) {
        let _ = self
            .socket
            .send(
                &self.event.from,
                OutboundPayload::Reaction {
                    emoji: emoji.to_string(),
                    key: self.event.key.clone(),
                },
                SendOptions::default(),
            )
            .await;
    }
}

/// A named command handler, built-in or externally registered.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// The command name this handler answers to (without prefix).
    fn name(&self) -> &str;

    /// Handle one dispatched event.
    async fn handle(&self, ctx: &CommandContext) -> Result<(), NimbusError>;
}
