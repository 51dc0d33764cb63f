// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in command handlers, run when no registered handler claims the
//! command name.

mod core;
pub(crate) mod group;
mod media;
mod payments;

use std::sync::Arc;

use nimbus_core::{CommandContext, NimbusError};
use nimbus_session::ConnectionSupervisor;

use crate::router::MessageRouter;

impl MessageRouter {
    pub(crate) async fn run_builtin(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        match ctx.command.as_str() {
            "ping" => self.cmd_ping(ctx).await,
            "menu" | "help" | "start" | "list" => self.cmd_menu(session, ctx).await,
            "owner" => self.cmd_owner(session, ctx).await,
            "play" => self.cmd_play(ctx).await,
            "logo" => self.cmd_logo(ctx).await,
            "vcf" => self.cmd_vcf(session, ctx).await,
            "url" => self.cmd_url(session, ctx).await,
            "tagall" => self.cmd_tagall(session, ctx).await,
            "view" => self.cmd_view(session, ctx).await,
            "pay" => self.show_payment_panel(session, ctx).await,
            "stk" | "request" => self.cmd_stk(session, ctx).await,
            "tx" | "transaction" => self.cmd_tx(session, ctx).await,
            "balance" => self.cmd_balance(ctx).await,
            "payments" | "payment" => self.show_payment_dashboard(ctx).await,
            "autosettings" => self.show_auto_settings(session, ctx).await,
            "status" => self.cmd_status(session, ctx).await,
            "plugins" => self.cmd_plugins(ctx).await,
            other => {
                ctx.reply(format!(
                    "❓ Unknown command: .{other}\n\nType .menu for commands"
                ))
                .await
            }
        }
    }
}
