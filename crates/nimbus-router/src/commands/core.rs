// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core commands: ping, menu, owner contacts, status, plugin listing,
//! and the auto-feature settings panel.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use nimbus_core::{Button, CommandContext, NimbusError};
use nimbus_session::ConnectionSupervisor;

use crate::router::MessageRouter;

/// East Africa Time, the bot's home timezone. No DST.
fn nairobi_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset)
}

fn greeting(hour: u32) -> (&'static str, &'static str) {
    if hour < 5 {
        ("Late Night Serenity", "🌙✨")
    } else if hour < 12 {
        ("Morning Precision", "☀️⚡")
    } else if hour < 17 {
        ("Afternoon Efficiency", "⛅🚀")
    } else if hour < 21 {
        ("Evening Excellence", "🌇🌟")
    } else {
        ("Night Innovation", "🌌💫")
    }
}

impl MessageRouter {
    pub(crate) async fn cmd_ping(&self, ctx: &CommandContext) -> Result<(), NimbusError> {
        let start = Utc::now();
        ctx.reply("🏓 Pong!").await?;
        let latency = (Utc::now() - start).num_milliseconds();
        ctx.reply(format!("⏱️ Latency: {latency}ms")).await
    }

    pub(crate) async fn cmd_menu(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let bot = session.bot_config();
        let now = nairobi_now();
        let (greeting, emoji) = greeting(now.hour());

        let text = format!(
            "{emoji} *{greeting}*, {}!\n\
             📅 {} (EAT)\n\n\
             • User: @{}\n\
             • Prefix: {}\n\
             • Status: ✅ Operational\n\n\
             *Select a module below:*",
            ctx.event.push_name,
            now.format("%a, %b %-d │ %-I:%M %p"),
            ctx.event.sender.user(),
            bot.prefix,
        );

        self.send_buttons(
            ctx,
            &format!("☁️ {} | Command Menu", bot.name),
            &text,
            &format!("{} | © {}", bot.name, now.format("%Y")),
            vec![
                Button::new("btn_ping", "⚡ Ping Test"),
                Button::new("btn_owner", "👑 Owner Suite"),
                Button::new("btn_play", "🎵 Music Center"),
                Button::new("btn_vcf", "📇 Export Tools"),
                Button::new("btn_tagall", "🏷️ Group Manager"),
                Button::new("btn_logo_menu", "🎨 Logo Maker"),
                Button::new("btn_url", "🌐 Media Upload"),
                Button::new("btn_view", "👁️ View Media"),
                Button::new("btn_payment", "💳 Payments"),
                Button::new("btn_status", "📊 System Info"),
            ],
        )
        .await
    }

    pub(crate) async fn cmd_owner(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let bot = session.bot_config();
        let primary = bot.owner_numbers.first().map(String::as_str).unwrap_or("unset");
        let secondary = bot.owner_numbers.get(1).map(String::as_str).unwrap_or("unset");

        self.send_buttons(
            ctx,
            "👑 Owner Suite",
            &format!(
                "*Contact Channels*\n\n\
                 • Primary: +{primary}\n\
                 • Secondary: +{secondary}\n\n\
                 Select your preferred contact method:"
            ),
            &bot.name,
            vec![
                Button::new("btn_contact_call1", "📞 Call Primary"),
                Button::new("btn_contact_call2", "📞 Call Secondary"),
                Button::new("btn_contact_whatsapp", "💬 WhatsApp"),
                Button::new("btn_menu_back", "🔙 Back"),
            ],
        )
        .await?;
        ctx.react("👑").await;
        Ok(())
    }

    pub(crate) async fn cmd_status(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let text = format!(
            "📊 *System Status*\n\n\
             🆔 Session: {}\n\
             🔌 State: {}\n\
             ⏱️ Uptime: {}\n\
             🔄 Reconnects: {}/{}\n\
             🔌 Plugins: {} loaded",
            session.session_id(),
            session.state(),
            session.uptime(),
            session.reconnect_attempts(),
            session.max_reconnect_attempts(),
            self.plugin_count(),
        );

        self.send_buttons(
            ctx,
            "📊 System Status",
            &text,
            "Real-time session metrics",
            vec![
                Button::new("btn_ping", "🏓 Ping Test"),
                Button::new("btn_plugins", "📦 Plugins"),
                Button::new("btn_menu_back", "🔙 Back"),
            ],
        )
        .await
    }

    pub(crate) async fn cmd_plugins(&self, ctx: &CommandContext) -> Result<(), NimbusError> {
        let names = self.plugin_names();
        let listing = if names.is_empty() {
            "_No external plugins registered._".to_string()
        } else {
            names
                .iter()
                .map(|name| format!("• .{name}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        ctx.reply(format!(
            "📦 *Loaded Plugins ({})*\n\n{listing}",
            names.len()
        ))
        .await
    }

    pub(crate) async fn show_auto_settings(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let auto_react = session.auto_react_enabled();
        let auto_status = session.auto_status_react_enabled();
        let on_off = |enabled: bool| if enabled { "✅ ON" } else { "❌ OFF" };

        self.send_buttons(
            ctx,
            "⚙️ Auto Features Settings",
            &format!(
                "*Current Settings:*\n\n\
                 💬 Auto Reaction: {}\n\
                 🌟 Auto Status Like: {}\n\n\
                 *Select setting to toggle:*",
                on_off(auto_react),
                on_off(auto_status),
            ),
            "Runtime toggles",
            vec![
                Button::new(
                    "btn_autoreact_toggle",
                    if auto_react {
                        "💬 Turn OFF Auto React"
                    } else {
                        "💬 Turn ON Auto React"
                    },
                ),
                Button::new(
                    "btn_autostatus_toggle",
                    if auto_status {
                        "🌟 Turn OFF Status Like"
                    } else {
                        "🌟 Turn ON Status Like"
                    },
                ),
                Button::new("btn_menu_back", "🔙 Back"),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::rig;
    use nimbus_core::OutboundPayload;
    use nimbus_test_utils::EventBuilder;

    #[test]
    fn greeting_bands_cover_the_day()
    {
        assert_eq!(greeting(2).0, "Late Night Serenity");
        assert_eq!(greeting(8).0, "Morning Precision");
        assert_eq!(greeting(14).0, "Afternoon Efficiency");
        assert_eq!(greeting(19).0, "Evening Excellence");
        assert_eq!(greeting(23).0, "Night Innovation");
    }

    #[tokio::test]
    async fn menu_sends_button_panel_with_modules() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".menu").build()).await;
        let sent = rig.socket.sent_messages().await;
        let buttons = sent
            .iter()
            .find_map(|s| match &s.payload {
                OutboundPayload::Buttons { buttons, .. } => Some(buttons.clone()),
                _ => None,
            })
            .expect("menu panel");
        assert_eq!(buttons.len(), 10);
        assert!(buttons.iter().any(|b| b.id == "btn_logo_menu"));
    }

    #[tokio::test]
    async fn help_alias_reaches_menu() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".help").build()).await;
        let sent = rig.socket.sent_messages().await;
        assert!(sent
            .iter()
            .any(|s| matches!(&s.payload, OutboundPayload::Buttons { .. })));
    }

    #[tokio::test]
    async fn status_reports_session_fields() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".status").build()).await;
        let sent = rig.socket.sent_messages().await;
        let text = sent
            .iter()
            .find_map(|s| match &s.payload {
                OutboundPayload::Buttons { text, .. } => Some(text.clone()),
                _ => None,
            })
            .expect("status panel");
        assert!(text.contains("Session: test"));
        assert!(text.contains("Reconnects: 0/3"));
    }

    #[tokio::test]
    async fn plugins_listing_with_empty_registry() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".plugins").build())
            .await;
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Loaded Plugins (0)")),
            "got: {texts:?}"
        );
    }
}
