// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Button dispatch: a flat id → action table.
//!
//! Ids are normalized with the `btn_` token before lookup. The one
//! structural exception is `btn_logo_select_<style>`, resolved by prefix
//! stripping against the logo style table. Every dispatch acks the click
//! with a reaction first, best-effort.

use std::sync::Arc;

use tracing::debug;

use nimbus_core::{Button, CommandContext, NimbusError};
use nimbus_media::{logo_categories, HostingService};
use nimbus_session::{ConnectionSupervisor, Pending, StagedAction};

use crate::commands::group::GroupScope;
use crate::router::MessageRouter;

fn lookup_category(category: &str) -> Option<&'static [&'static str]> {
    logo_categories()
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, styles)| *styles)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl MessageRouter {
    pub(crate) async fn dispatch_button(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        raw_id: &str,
    ) -> Result<(), NimbusError> {
        let id = if raw_id.starts_with("btn_") {
            raw_id.to_string()
        } else {
            format!("btn_{raw_id}")
        };

        // Ack the click before acting.
        ctx.react("✅").await;

        match id.as_str() {
            "btn_ping" => self.cmd_ping(ctx).await,
            "btn_status" => self.cmd_status(session, ctx).await,
            "btn_menu" | "btn_menu_back" => self.cmd_menu(session, ctx).await,
            "btn_owner" => self.cmd_owner(session, ctx).await,
            "btn_plugins" => self.cmd_plugins(ctx).await,

            "btn_play" => self.cmd_play(ctx).await,
            "btn_music_search" => {
                ctx.reply(
                    "🎵 *Music Search*\n\nType: `.play [song name or artist]`\n\n\
                     Examples:\n• .play drake\n• .play shape of you",
                )
                .await
            }
            "btn_music_pop" => {
                ctx.reply(
                    "🎤 *Popular Music*\n\nTry these searches:\n\
                     • .play taylor swift\n• .play ed sheeran\n• .play ariana grande",
                )
                .await
            }
            "btn_music_hiphop" => {
                ctx.reply(
                    "🎧 *Hip Hop/Rap*\n\nTry these searches:\n\
                     • .play kendrick lamar\n• .play travis scott\n• .play j cole",
                )
                .await
            }
            "btn_music_afro" => {
                ctx.reply(
                    "🌍 *Afro Beats*\n\nTry these searches:\n\
                     • .play burna boy\n• .play wizkid\n• .play davido",
                )
                .await
            }

            "btn_logo_menu" => self.show_logo_categories(ctx).await,

            "btn_vcf" => self.cmd_vcf(session, ctx).await,
            "btn_vcf_all" => self.staged_export(session, ctx, GroupScope::All).await,
            "btn_vcf_admins" => self.staged_export(session, ctx, GroupScope::Admins).await,
            "btn_vcf_cancel" => {
                session.pending_actions().cancel(&ctx.event.sender);
                ctx.reply("✅ VCF export cancelled.").await
            }

            "btn_tagall" => self.cmd_tagall(session, ctx).await,
            "btn_tag_all" => self.staged_tag(session, ctx, GroupScope::All).await,
            "btn_tag_admins" => self.staged_tag(session, ctx, GroupScope::Admins).await,
            "btn_tag_regular" => self.staged_tag(session, ctx, GroupScope::Regular).await,
            "btn_tag_custom" => self.staged_custom_tag(session, ctx).await,
            "btn_tag_cancel" => {
                session.pending_actions().cancel(&ctx.event.sender);
                ctx.reply("✅ Tag operation cancelled.").await
            }

            "btn_url" => self.cmd_url(session, ctx).await,
            "btn_url_tmpfiles" => {
                self.staged_upload(session, ctx, HostingService::TmpFiles).await
            }
            "btn_url_catbox" => self.staged_upload(session, ctx, HostingService::Catbox).await,
            "btn_url_tutorial" => {
                ctx.reply(
                    "📚 *Media Upload Tutorial*\n\n\
                     1. Reply to any media\n2. Type .url\n3. Select service\n\
                     4. Get shareable link\n\n📁 Max Size: 50MB",
                )
                .await
            }
            "btn_url_cancel" => {
                session.pending_actions().cancel(&ctx.event.sender);
                ctx.reply("✅ Upload cancelled.").await
            }

            "btn_view" => self.cmd_view(session, ctx).await,
            "btn_view_info" => {
                ctx.reply(
                    "👁️ *Media Viewer*\n\n\
                     Reply to a view-once or regular media message with .view,\n\
                     then pick an action from the buttons.",
                )
                .await
            }
            "btn_view_download" => self.staged_view_download(session, ctx).await,
            "btn_view_info_full" => self.staged_view_info(session, ctx).await,
            "btn_view_cancel" => {
                session.pending_actions().cancel(&ctx.event.sender);
                ctx.reply("✅ Media viewer closed.").await
            }

            "btn_payment" | "btn_pay" => self.show_payment_panel(session, ctx).await,
            "btn_stk_100" => self.prompt_stk_phone(session, ctx, 100.0).await,
            "btn_stk_500" => self.prompt_stk_phone(session, ctx, 500.0).await,
            "btn_stk_1000" => self.prompt_stk_phone(session, ctx, 1000.0).await,
            "btn_stk_custom" | "btn_stk_custom_input" => {
                ctx.reply("Enter amount for STK push:").await?;
                session
                    .user_states()
                    .set(&ctx.event.sender, Pending::StkAmount);
                Ok(())
            }
            "btn_check_tx" => {
                ctx.reply("Enter transaction reference:").await?;
                session
                    .user_states()
                    .set(&ctx.event.sender, Pending::TxReference);
                Ok(())
            }
            "btn_payment_dashboard" => self.show_payment_dashboard(ctx).await,
            "btn_payment_health" => self.cmd_balance(ctx).await,
            "btn_payment_info" => self.show_payment_info(ctx).await,

            "btn_contact_owner" | "btn_contact_call1" => {
                self.reply_owner_contact(session, ctx, 0, "📞 *Call Primary:*").await
            }
            "btn_contact_call2" => {
                self.reply_owner_contact(session, ctx, 1, "📞 *Call Secondary:*").await
            }
            "btn_contact_whatsapp" => {
                let number = session
                    .bot_config()
                    .owner_numbers
                    .first()
                    .cloned()
                    .unwrap_or_default();
                ctx.reply(format!(
                    "💬 *WhatsApp:* https://wa.me/{number}\n\nTap the link to start a chat."
                ))
                .await
            }

            "btn_autosettings" => self.show_auto_settings(session, ctx).await,
            "btn_autoreact_toggle" => {
                let enabled = !session.auto_react_enabled();
                session.set_auto_react(enabled);
                ctx.reply(format!(
                    "💬 Auto React is now {}",
                    if enabled { "ON" } else { "OFF" }
                ))
                .await?;
                self.show_auto_settings(session, ctx).await
            }
            "btn_autostatus_toggle" => {
                let enabled = !session.auto_status_react_enabled();
                session.set_auto_status_react(enabled);
                ctx.reply(format!(
                    "🌟 Auto Status Like is now {}",
                    if enabled { "ON" } else { "OFF" }
                ))
                .await?;
                self.show_auto_settings(session, ctx).await
            }

            other => {
                if let Some(style) = other.strip_prefix("btn_logo_select_") {
                    return ctx
                        .reply(format!(
                            "🎨 *Logo Style Selected:* {style}\n\nNow type:\n\
                             `.logo {style} YOUR TEXT HERE`"
                        ))
                        .await;
                }
                if let Some(category) = other.strip_prefix("btn_logo_") {
                    if let Some(styles) = lookup_category(category) {
                        return self.show_logo_styles(ctx, category, styles).await;
                    }
                }
                debug!(button = other, "button not implemented");
                ctx.reply(format!(
                    "❌ Button action \"{raw_id}\" not found.\n\nTry: .menu for commands"
                ))
                .await
            }
        }
    }

    async fn prompt_stk_phone(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        amount: f64,
    ) -> Result<(), NimbusError> {
        ctx.reply(format!("Enter phone number for KES {amount} STK:"))
            .await?;
        session
            .user_states()
            .set(&ctx.event.sender, Pending::StkPhone { amount });
        Ok(())
    }

    async fn reply_owner_contact(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        index: usize,
        label: &str,
    ) -> Result<(), NimbusError> {
        let number = session
            .bot_config()
            .owner_numbers
            .get(index)
            .map(String::as_str)
            .unwrap_or("unset");
        ctx.reply(format!(
            "{label} +{number}\n\nTap the number to call or copy it."
        ))
        .await
    }

    async fn show_logo_categories(&self, ctx: &CommandContext) -> Result<(), NimbusError> {
        let buttons = logo_categories()
            .iter()
            .map(|(category, _)| {
                Button::new(format!("btn_logo_{category}"), capitalize(category))
            })
            .collect();
        self.send_buttons(
            ctx,
            "🎨 Logo Generator",
            "*Select logo category:*\n\nOr type directly:\n.logo [style] [text]",
            "Choose a category or type manually",
            buttons,
        )
        .await
    }

    async fn show_logo_styles(
        &self,
        ctx: &CommandContext,
        category: &str,
        styles: &[&str],
    ) -> Result<(), NimbusError> {
        let mut buttons: Vec<Button> = styles
            .iter()
            .take(5)
            .map(|style| Button::new(format!("btn_logo_select_{style}"), capitalize(style)))
            .collect();
        buttons.push(Button::new("btn_logo_menu", "🔙 Back"));

        self.send_buttons(
            ctx,
            &format!("🎨 {} Logos", capitalize(category)),
            &format!(
                "*Select a style:*\n\nThen type:\n.logo [style] [your text]\n\n\
                 Example: .logo {} NIMBUS",
                styles.first().unwrap_or(&"glow")
            ),
            "Click style, then type command",
            buttons,
        )
        .await
    }

    async fn staged_export(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        scope: GroupScope,
    ) -> Result<(), NimbusError> {
        match session.pending_actions().take(&ctx.event.sender) {
            Some(StagedAction::GroupExport { metadata }) => {
                self.run_staged_export(ctx, metadata, scope).await
            }
            _ => ctx.reply("❌ Please run .vcf command first.").await,
        }
    }

    async fn staged_tag(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        scope: GroupScope,
    ) -> Result<(), NimbusError> {
        match session.pending_actions().take(&ctx.event.sender) {
            Some(StagedAction::GroupTag { metadata }) => {
                self.run_staged_tag(ctx, metadata, scope).await
            }
            _ => ctx.reply("❌ Please run .tagall command first.").await,
        }
    }

    async fn staged_custom_tag(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        match session.pending_actions().take(&ctx.event.sender) {
            Some(StagedAction::GroupTag { metadata }) => {
                ctx.reply("✏️ Type the message to send with the tags:").await?;
                session.user_states().set(
                    &ctx.event.sender,
                    Pending::CustomTagMessage {
                        participants: metadata
                            .participants
                            .iter()
                            .map(|m| m.jid.clone())
                            .collect(),
                    },
                );
                Ok(())
            }
            _ => ctx.reply("❌ Please run .tagall command first.").await,
        }
    }

    async fn staged_upload(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        service: HostingService,
    ) -> Result<(), NimbusError> {
        match session.pending_actions().take(&ctx.event.sender) {
            Some(StagedAction::Upload { media }) => {
                self.run_staged_upload(ctx, media, service).await
            }
            _ => ctx.reply("❌ Please reply to media first with .url").await,
        }
    }

    async fn staged_view_download(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        match session.pending_actions().take(&ctx.event.sender) {
            Some(StagedAction::MediaView { media, bytes }) => {
                self.send_staged_media(ctx, &media, bytes).await
            }
            _ => ctx.reply("❌ No media data found.").await,
        }
    }

    async fn staged_view_info(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        // Info keeps the staged media so a download can still follow.
        match session.pending_actions().get(&ctx.event.sender) {
            Some(StagedAction::MediaView { media, bytes }) => {
                self.send_media_info(ctx, &media, &bytes).await
            }
            _ => ctx.reply("❌ No media data found.").await,
        }
    }
}
