// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group tooling: vCard contact export and the tag-everyone blast.
//! Both stage group metadata for a follow-up button choice.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use nimbus_core::{
    Button, CommandContext, GroupMember, GroupMetadata, NimbusError, OutboundPayload, SendOptions,
};
use nimbus_session::{ConnectionSupervisor, StagedAction};

use crate::router::MessageRouter;

/// Which slice of a group an export or tag targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupScope {
    All,
    Admins,
    Regular,
}

impl GroupScope {
    fn label(self) -> &'static str {
        match self {
            GroupScope::All => "All Members",
            GroupScope::Admins => "Administrators",
            GroupScope::Regular => "Regular Members",
        }
    }

    fn select(self, metadata: &GroupMetadata) -> Vec<GroupMember> {
        match self {
            GroupScope::All => metadata.participants.clone(),
            GroupScope::Admins => metadata.admins(),
            GroupScope::Regular => metadata.regular_members(),
        }
    }
}

/// Synthesize a vCard 3.0 document for the given members.
pub(crate) fn render_vcf(metadata: &GroupMetadata, members: &[GroupMember]) -> String {
    let mut out = String::new();
    for member in members {
        let phone = member.jid.user();
        let name = member
            .name
            .clone()
            .unwrap_or_else(|| format!("User_{phone}"));
        out.push_str("BEGIN:VCARD\n");
        out.push_str("VERSION:3.0\n");
        out.push_str(&format!("FN:{name}\n"));
        out.push_str(&format!("N:{name};;;;\n"));
        if member.is_admin {
            out.push_str("ROLE:Administrator\n");
            out.push_str("TITLE:Group Admin\n");
        }
        out.push_str(&format!("TEL;TYPE=CELL,VOICE:+{phone}\n"));
        out.push_str(&format!(
            "NOTE:Exported from {} WhatsApp Group\n",
            metadata.subject
        ));
        out.push_str("END:VCARD\n\n");
    }
    out
}

fn vcf_file_name(subject: &str, scope: GroupScope) -> String {
    let clean: String = subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(30)
        .collect();
    let scope = match scope {
        GroupScope::All => "all",
        GroupScope::Admins => "admins",
        GroupScope::Regular => "regular",
    };
    format!(
        "contacts_{clean}_{scope}_{}.vcf",
        Utc::now().timestamp_millis()
    )
}

impl MessageRouter {
    pub(crate) async fn cmd_vcf(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        if !ctx.event.is_group {
            return ctx
                .reply("❌ *Group Command Only*\nThis feature requires a group context.")
                .await;
        }

        let metadata = match ctx.socket.group_metadata(&ctx.event.from).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(group = %ctx.event.from, error = %e, "group metadata fetch failed");
                return ctx.reply("❌ Failed to analyze group.").await;
            }
        };

        let text = format!(
            "*Group Analysis Complete*\n\n\
             🏷️ Group: {}\n\
             👥 Total Members: {}\n\
             👑 Administrators: {}\n\n\
             *Select export format:*",
            metadata.subject,
            metadata.participants.len(),
            metadata.admins().len(),
        );

        session
            .pending_actions()
            .stage(&ctx.event.sender, StagedAction::GroupExport { metadata });

        self.send_buttons(
            ctx,
            "📇 Contact Export",
            &text,
            "vCard 3.0 format",
            vec![
                Button::new("btn_vcf_all", "📋 Export All Contacts"),
                Button::new("btn_vcf_admins", "👑 Export Admins Only"),
                Button::new("btn_vcf_cancel", "❌ Cancel Export"),
            ],
        )
        .await
    }

    /// Consume a staged export and send the vCard document.
    pub(crate) async fn run_staged_export(
        &self,
        ctx: &CommandContext,
        metadata: GroupMetadata,
        scope: GroupScope,
    ) -> Result<(), NimbusError> {
        let members = scope.select(&metadata);
        if members.is_empty() {
            return ctx
                .reply(format!(
                    "❌ No {} found to export.",
                    scope.label().to_lowercase()
                ))
                .await;
        }

        ctx.reply(format!(
            "⏳ Creating VCF file for {} contacts...",
            members.len()
        ))
        .await?;
        ctx.react("⏳").await;

        let content = render_vcf(&metadata, &members);
        let file_name = vcf_file_name(&metadata.subject, scope);
        let size_kb = content.len() as f64 / 1024.0;

        ctx.socket
            .send(
                &ctx.event.from,
                OutboundPayload::Document {
                    file_name: file_name.clone(),
                    mimetype: "text/vcard".to_string(),
                    content: content.into_bytes(),
                    caption: format!(
                        "✅ *Contact Export Complete*\n\n\
                         📁 File: {file_name}\n\
                         🏷️ Group: {}\n\
                         📊 Type: {}\n\
                         👥 Exported: {} contacts\n\
                         📦 Size: {size_kb:.2} KB",
                        metadata.subject,
                        scope.label(),
                        members.len(),
                    ),
                },
                SendOptions {
                    quoted: Some(ctx.event.key.clone()),
                    ..SendOptions::default()
                },
            )
            .await?;
        ctx.react("✅").await;
        Ok(())
    }

    pub(crate) async fn cmd_tagall(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        if !ctx.event.is_group {
            return ctx
                .reply("❌ *Group Command Only*\nThis feature requires group context.")
                .await;
        }

        let metadata = match ctx.socket.group_metadata(&ctx.event.from).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(group = %ctx.event.from, error = %e, "group metadata fetch failed");
                return ctx.reply("❌ Failed to analyze group.").await;
            }
        };

        if !metadata.is_admin(&ctx.event.sender) {
            return ctx
                .reply("🔒 *Admin Required*\nOnly group administrators can use this feature.")
                .await;
        }
        if !metadata.is_admin(&ctx.socket.self_jid()) {
            return ctx
                .reply("⚠️ *Bot Permission Required*\nI need admin rights to tag all members.")
                .await;
        }

        let text = format!(
            "*Group Analysis Complete*\n\n\
             🏷️ Group: {}\n\
             📊 Members: {}\n\
             👑 Admins: {}\n\
             👤 Regular: {}\n\n\
             *Select tagging option:*",
            metadata.subject,
            metadata.participants.len(),
            metadata.admins().len(),
            metadata.regular_members().len(),
        );

        session
            .pending_actions()
            .stage(&ctx.event.sender, StagedAction::GroupTag { metadata });

        self.send_buttons(
            ctx,
            "🏷️ Group Tag Manager",
            &text,
            "Group management",
            vec![
                Button::new("btn_tag_all", "👥 Tag Everyone"),
                Button::new("btn_tag_admins", "👑 Tag Admins Only"),
                Button::new("btn_tag_regular", "👤 Tag Regular Members"),
                Button::new("btn_tag_custom", "✏️ Custom Message"),
                Button::new("btn_tag_cancel", "❌ Cancel"),
            ],
        )
        .await
    }

    /// Consume a staged tag and blast a mention message at the scope.
    pub(crate) async fn run_staged_tag(
        &self,
        ctx: &CommandContext,
        metadata: GroupMetadata,
        scope: GroupScope,
    ) -> Result<(), NimbusError> {
        let members = scope.select(&metadata);
        if members.is_empty() {
            return ctx
                .reply(format!(
                    "❌ No {} found to tag.",
                    scope.label().to_lowercase()
                ))
                .await;
        }

        ctx.reply(format!("⏳ Tagging {} members...", members.len()))
            .await?;
        ctx.react("⏳").await;

        let mentions: Vec<_> = members.iter().map(|m| m.jid.clone()).collect();
        let mention_texts: Vec<String> = mentions.iter().map(|j| format!("@{}", j.user())).collect();

        let text = format!(
            "🔔 *{} NOTIFICATION*\n\n\
             Message from: @{}\n\
             Group: {}\n\n\
             {}",
            scope.label().to_uppercase(),
            ctx.event.sender.user(),
            metadata.subject,
            mention_texts.join(" "),
        );

        ctx.socket
            .send(
                &ctx.event.from,
                OutboundPayload::Mentions { text, mentions },
                SendOptions {
                    quoted: Some(ctx.event.key.clone()),
                    ..SendOptions::default()
                },
            )
            .await?;
        ctx.react("✅").await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::rig;
    use nimbus_core::Jid;
    use nimbus_session::Pending;
    use nimbus_test_utils::EventBuilder;

    fn group_meta(group: &str) -> GroupMetadata {
        GroupMetadata {
            jid: Jid::new(group),
            subject: "Test Group".to_string(),
            participants: vec![
                GroupMember {
                    jid: Jid::new("254712345678@s.whatsapp.net"),
                    name: Some("Alice".to_string()),
                    is_admin: true,
                },
                GroupMember {
                    jid: Jid::new("254700000001@s.whatsapp.net"),
                    name: None,
                    is_admin: false,
                },
                GroupMember {
                    jid: Jid::new("bot@s.whatsapp.net"),
                    name: Some("Bot".to_string()),
                    is_admin: true,
                },
            ],
        }
    }

    #[test]
    fn vcf_marks_admins_with_role() {
        let metadata = group_meta("123@g.us");
        let content = render_vcf(&metadata, &metadata.participants);
        assert!(content.contains("BEGIN:VCARD"));
        assert!(content.contains("FN:Alice"));
        assert!(content.contains("ROLE:Administrator"));
        assert!(content.contains("FN:User_254700000001"));
        assert!(content.contains("TEL;TYPE=CELL,VOICE:+254700000001"));
        assert!(content.contains("NOTE:Exported from Test Group WhatsApp Group"));
    }

    #[test]
    fn vcf_file_name_sanitizes_subject() {
        let name = vcf_file_name("My Group!", GroupScope::Admins);
        assert!(name.starts_with("contacts_My_Group__admins_"));
        assert!(name.ends_with(".vcf"));
    }

    #[tokio::test]
    async fn vcf_in_dm_is_rejected() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".vcf").build()).await;
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Group Command Only")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn vcf_in_group_stages_export() {
        let rig = rig();
        let event = EventBuilder::group().text(".vcf").build();
        rig.socket
            .set_group_metadata(group_meta(event.from.as_str()))
            .await;

        rig.dispatch(event.clone()).await;

        assert!(matches!(
            rig.session.pending_actions().get(&event.sender),
            Some(StagedAction::GroupExport { .. })
        ));
    }

    #[tokio::test]
    async fn tagall_requires_sender_admin() {
        let rig = rig();
        let event = EventBuilder::group()
            .sender("254700000001@s.whatsapp.net")
            .text(".tagall")
            .build();
        rig.socket
            .set_group_metadata(group_meta(event.from.as_str()))
            .await;

        rig.dispatch(event).await;

        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Admin Required")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn tagall_requires_bot_admin() {
        let rig = rig();
        let event = EventBuilder::group().text(".tagall").build();
        let mut metadata = group_meta(event.from.as_str());
        // Demote the bot.
        for member in &mut metadata.participants {
            if member.jid.as_str().starts_with("bot@") {
                member.is_admin = false;
            }
        }
        rig.socket.set_group_metadata(metadata).await;

        rig.dispatch(event).await;

        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Bot Permission Required")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn tag_custom_button_sets_pending_message_state() {
        let rig = rig();
        let event = EventBuilder::group().text(".tagall").build();
        rig.socket
            .set_group_metadata(group_meta(event.from.as_str()))
            .await;
        rig.dispatch(event.clone()).await;

        rig.dispatch(
            EventBuilder::group()
                .text("btn_tag_custom")
                .build(),
        )
        .await;

        assert!(matches!(
            rig.session.user_states().get(&event.sender),
            Some(Pending::CustomTagMessage { .. })
        ));
    }
}
