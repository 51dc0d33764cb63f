// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event classification.
//!
//! Classification is a strict priority chain; the first matching rule wins:
//!
//! 1. status broadcast (observer side effect, never regular dispatch)
//! 2. button/list reply, including legacy `btn_` free text
//! 3. pending user state, unless the text re-enters the command path
//! 4. prefix command: registered handlers first, then built-ins
//! 5. no match: the event is left to the auto-react observer alone

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use nimbus_core::{CommandContext, InboundEvent, NimbusError, ProtocolClient};
use nimbus_media::{HostingClient, LogoClient, MusicClient};
use nimbus_payments::PaymentClient;
use nimbus_plugin::{CommandRegistry, ExecuteOutcome};
use nimbus_session::{ConnectionSupervisor, MessageDispatcher};

use crate::observers;

/// Classifies inbound events and runs button, continuation, and command
/// handlers. One router instance is shared across all sessions.
pub struct MessageRouter {
    pub(crate) commands: CommandRegistry,
    pub(crate) payments: Arc<PaymentClient>,
    pub(crate) logo: LogoClient,
    pub(crate) music: MusicClient,
    pub(crate) hosting: HostingClient,
}

impl MessageRouter {
    pub fn new(commands: CommandRegistry, payments: Arc<PaymentClient>) -> Self {
        Self {
            commands,
            payments,
            logo: LogoClient::new(),
            music: MusicClient::new(),
            hosting: HostingClient::new(),
        }
    }

    /// Number of externally registered command handlers.
    pub fn plugin_count(&self) -> usize {
        self.commands.len()
    }

    /// Names of externally registered command handlers, sorted.
    pub fn plugin_names(&self) -> Vec<String> {
        self.commands.list()
    }

    async fn run_command(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        match self.commands.execute(&ctx.command, ctx).await? {
            ExecuteOutcome::Handled => Ok(()),
            ExecuteOutcome::NotFound => self.run_builtin(session, ctx).await,
        }
    }
}

#[async_trait]
impl MessageDispatcher for MessageRouter {
    async fn dispatch(
        &self,
        session: Arc<ConnectionSupervisor>,
        event: InboundEvent,
        socket: Arc<dyn ProtocolClient>,
    ) {
        // Rule 1: status updates get a like and nothing else. Plain
        // messages are never addressed to the broadcast jid.
        if event.from.is_status_broadcast() {
            if session.auto_status_react_enabled() && !event.is_self {
                observers::react_to_status(&event, socket.as_ref(), &socket.self_jid()).await;
            }
            return;
        }

        // Auto-react runs as an observer independent of what matches below.
        if session.auto_react_enabled() && !event.is_self {
            observers::react_to_message(&event, socket.as_ref()).await;
        }

        let mut ctx = CommandContext {
            event: event.clone(),
            command: String::new(),
            args: String::new(),
            socket,
        };

        // Rule 2: structured button/list replies, and legacy clients that
        // echo the button id as free text.
        let button_id = event
            .structured_button_id()
            .map(str::to_string)
            .or_else(|| {
                event
                    .extracted_text()
                    .filter(|t| t.starts_with("btn_"))
                    .map(str::to_string)
            });
        if let Some(id) = button_id {
            debug!(button = %id, sender = %event.sender, "dispatching button");
            if let Err(e) = self.dispatch_button(&session, &ctx, &id).await {
                warn!(button = %id, error = %e, "button dispatch failed");
                let _ = ctx.reply(format!("❌ Action failed: {e}")).await;
            }
            return;
        }

        let text = match event.extracted_text() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => return,
        };

        let prefix = session.bot_config().prefix.clone();

        // Rule 3: a pending multi-step interaction consumes the next text
        // from its user. A prefixed command always breaks out of the flow.
        if session.user_states().get(&event.sender).is_some() {
            if !text.starts_with(&prefix) {
                if let Some(pending) = session.user_states().take(&event.sender) {
                    debug!(sender = %event.sender, "continuing pending interaction");
                    if let Err(e) = self.continue_pending(&session, &ctx, pending, &text).await {
                        warn!(sender = %event.sender, error = %e, "continuation failed");
                        let _ = ctx.reply(format!("❌ {e}")).await;
                    }
                }
                return;
            }
            session.user_states().clear_user(&event.sender);
        }

        // Rule 4: prefix command.
        if let Some(stripped) = text.strip_prefix(&prefix) {
            let mut parts = stripped.splitn(2, ' ');
            let command = parts.next().unwrap_or_default().to_lowercase();
            if command.is_empty() {
                return;
            }
            ctx.command = command;
            ctx.args = parts.next().unwrap_or_default().trim().to_string();

            debug!(command = %ctx.command, sender = %event.sender, "dispatching command");
            if let Err(e) = self.run_command(&session, &ctx).await {
                warn!(command = %ctx.command, error = %e, "command failed");
                let _ = ctx.reply(format!("❌ Command failed: {e}")).await;
            }
        }

        // Rule 5: plain text with no match is a no-op.
    }
}
