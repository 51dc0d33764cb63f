// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media commands: music download, logo generation, media upload staging,
//! and the quoted-media viewer.

use std::sync::Arc;

use tracing::warn;

use nimbus_core::{
    Button, CommandContext, MediaKind, MediaRef, NimbusError, OutboundPayload, SendOptions,
};
use nimbus_media::{logo_style_segment, invalid_style_message, logo_style_count, MAX_LOGO_TEXT};
use nimbus_session::{ConnectionSupervisor, StagedAction};

use crate::router::MessageRouter;

/// File extension used when re-hosting a media kind.
pub(crate) fn extension_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "jpg",
        MediaKind::Video => "mp4",
        MediaKind::Audio => "mp3",
        MediaKind::Document => "bin",
    }
}

pub(crate) fn mimetype_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image/jpeg",
        MediaKind::Video => "video/mp4",
        MediaKind::Audio => "audio/mpeg",
        MediaKind::Document => "application/octet-stream",
    }
}

impl MessageRouter {
    pub(crate) async fn cmd_play(&self, ctx: &CommandContext) -> Result<(), NimbusError> {
        if ctx.args.is_empty() {
            return self
                .send_buttons(
                    ctx,
                    "🎵 Music Center",
                    "*Audio Downloader*\n\n\
                     🎧 How to use:\n\
                     • .play [song name]\n\
                     • .play [artist name]\n\
                     • .play [YouTube link]\n\n\
                     Example: .play drake hotline bling",
                    "Audio streaming",
                    vec![
                        Button::new("btn_music_search", "🔍 Search Music"),
                        Button::new("btn_music_pop", "🎤 Pop Hits"),
                        Button::new("btn_music_hiphop", "🎧 Hip Hop"),
                        Button::new("btn_music_afro", "🌍 Afro Beats"),
                    ],
                )
                .await;
        }

        ctx.react("🎶").await;
        ctx.reply(format!("🔍 Searching for: \"{}\"...", ctx.args))
            .await?;

        match self.music.resolve(&ctx.args).await {
            Ok(track) => {
                if let Some(thumbnail) = &track.thumbnail {
                    let caption = format!(
                        "*MUSIC DOWNLOADER*\n\n\
                         🎵 *Title:* {}\n\
                         📦 *Size:* {}\n\
                         ⚡ *Quality:* MP3\n\n\
                         _Sending your audio..._",
                        track.title,
                        track.filesize.as_deref().unwrap_or("Unknown"),
                    );
                    let _ = ctx
                        .socket
                        .send(
                            &ctx.event.from,
                            OutboundPayload::Image {
                                url: thumbnail.clone(),
                                caption,
                            },
                            SendOptions {
                                quoted: Some(ctx.event.key.clone()),
                                ..SendOptions::default()
                            },
                        )
                        .await;
                }
                ctx.socket
                    .send(
                        &ctx.event.from,
                        OutboundPayload::Audio {
                            url: track.audio_url.clone(),
                            file_name: format!("{}.mp3", track.title),
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
            Err(e) => {
                warn!(query = %ctx.args, error = %e, "music download failed");
                ctx.reply(format!("❌ *Download Failed*\n\n{e}")).await?;
                ctx.react("❌").await;
                Ok(())
            }
        }
    }

    pub(crate) async fn cmd_logo(&self, ctx: &CommandContext) -> Result<(), NimbusError> {
        let mut parts = ctx.args.splitn(2, ' ');
        let style = parts.next().unwrap_or_default();
        let text = parts.next().unwrap_or_default().trim();

        if style.is_empty() {
            return self
                .send_buttons(
                    ctx,
                    "🎨 Logo Generator",
                    &format!(
                        "*How to use:*\n.logo [style] [text]\n\n\
                         Example: .logo glow NIMBUS\n\n\
                         Total styles: {}",
                        logo_style_count()
                    ),
                    "Navigate through menus or type directly",
                    vec![Button::new("btn_logo_menu", "🎨 Browse Styles")],
                )
                .await;
        }

        if logo_style_segment(style).is_none() {
            return ctx.reply(invalid_style_message()).await;
        }

        if text.is_empty() {
            return ctx
                .reply(format!(
                    "❌ Please provide text!\nUsage: .logo {style} [your text]"
                ))
                .await;
        }

        if text.len() > MAX_LOGO_TEXT {
            return ctx
                .reply(format!(
                    "❌ Text too long! Max {MAX_LOGO_TEXT} chars.\n\nYour text: {} characters",
                    text.len()
                ))
                .await;
        }

        ctx.react("⏳").await;
        match self.logo.generate(style, text).await {
            Ok(url) => {
                ctx.socket
                    .send(
                        &ctx.event.from,
                        OutboundPayload::Image {
                            url,
                            caption: format!("✅ Logo created!\nStyle: {style}\nText: {text}"),
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
            Err(e) => {
                warn!(style, error = %e, "logo generation failed");
                ctx.reply(format!("❌ Failed to generate logo: {e}")).await?;
                ctx.react("❌").await;
                Ok(())
            }
        }
    }

    pub(crate) async fn cmd_url(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let media = match &ctx.event.quoted_media {
            Some(media) => media.clone(),
            None => {
                return self
                    .send_buttons(
                        ctx,
                        "🌐 Media Uploader",
                        "*How to use:*\n\
                         1. Reply to any media\n\
                         2. Type .url\n\
                         3. Select service\n\
                         4. Get shareable link\n\n\
                         📁 Max Size: 50MB\n\
                         ⚡ Supported: Images, Videos, Audio, Documents",
                        "Media hosting",
                        vec![
                            Button::new("btn_url_tutorial", "📚 Tutorial"),
                            Button::new("btn_menu_back", "🔙 Back"),
                        ],
                    )
                    .await;
            }
        };

        session
            .pending_actions()
            .stage(&ctx.event.sender, StagedAction::Upload { media });

        self.send_buttons(
            ctx,
            "⬆️ Media Upload",
            "*MEDIA DETECTED*\n\nSelect hosting service:",
            "Media hosting",
            vec![
                Button::new("btn_url_tmpfiles", "🌐 TmpFiles (1 Hour)"),
                Button::new("btn_url_catbox", "📦 Catbox (Permanent)"),
                Button::new("btn_url_cancel", "❌ Cancel"),
            ],
        )
        .await
    }

    pub(crate) async fn cmd_view(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
    ) -> Result<(), NimbusError> {
        let media = match &ctx.event.quoted_media {
            Some(media) => media.clone(),
            None => {
                return self
                    .send_buttons(
                        ctx,
                        "👁️ Media Viewer",
                        "*Media Downloader*\n\n\
                         Reply to a view-once or regular media message with .view",
                        "View and download media",
                        vec![
                            Button::new("btn_view_info", "ℹ️ How to Use"),
                            Button::new("btn_menu_back", "🔙 Back"),
                        ],
                    )
                    .await;
            }
        };

        let bytes = match ctx.socket.download_media(&media).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "media download failed");
                return ctx.reply("❌ Error processing media.").await;
            }
        };

        let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
        let text = format!(
            "*Media Details:*\n\
             • Type: {}\n\
             • Size: {size_mb:.2} MB\n\
             • From: @{}",
            media.kind,
            ctx.event.sender.user()
        );
        let title = format!("📁 {} Detected", media.kind.to_string().to_uppercase());

        session
            .pending_actions()
            .stage(&ctx.event.sender, StagedAction::MediaView { media, bytes });

        self.send_buttons(
            ctx,
            &title,
            &text,
            "Select action:",
            vec![
                Button::new("btn_view_download", "⬇️ Download"),
                Button::new("btn_view_info_full", "📊 Full Info"),
                Button::new("btn_view_cancel", "❌ Close"),
            ],
        )
        .await
    }

    /// Consume a staged upload and push it to the chosen hosting service.
    pub(crate) async fn run_staged_upload(
        &self,
        ctx: &CommandContext,
        media: MediaRef,
        service: nimbus_media::HostingService,
    ) -> Result<(), NimbusError> {
        ctx.reply(format!("⚙️ Uploading to {}...", service.display_name()))
            .await?;
        ctx.react("⏳").await;

        let bytes = match ctx.socket.download_media(&media).await {
            Ok(bytes) => bytes,
            Err(e) => {
                ctx.reply(format!("❌ Upload failed: {e}")).await?;
                ctx.react("❌").await;
                return Ok(());
            }
        };
        let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);

        match self
            .hosting
            .upload(service, bytes, extension_for(media.kind))
            .await
        {
            Ok(url) => {
                ctx.reply(format!(
                    "✅ *Upload Successful*\n\n\
                     🌐 Service: {}\n\
                     📁 Size: {size_mb:.2}MB\n\
                     🔗 URL: {url}\n\n\
                     Link expires: {}",
                    service.display_name(),
                    service.retention(),
                ))
                .await?;
                ctx.react("✅").await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "hosted upload failed");
                ctx.reply(format!("❌ Upload failed: {e}")).await?;
                ctx.react("❌").await;
                Ok(())
            }
        }
    }

    /// Send staged viewer media back into the chat as a document.
    pub(crate) async fn send_staged_media(
        &self,
        ctx: &CommandContext,
        media: &MediaRef,
        bytes: Vec<u8>,
    ) -> Result<(), NimbusError> {
        ctx.react("⏳").await;
        let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
        ctx.socket
            .send(
                &ctx.event.from,
                OutboundPayload::Document {
                    file_name: format!("download.{}", extension_for(media.kind)),
                    mimetype: mimetype_for(media.kind).to_string(),
                    content: bytes,
                    caption: format!("📥 Downloaded {}\nSize: {size_mb:.2} MB", media.kind),
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

    /// Detailed info reply for staged viewer media.
    pub(crate) async fn send_media_info(
        &self,
        ctx: &CommandContext,
        media: &MediaRef,
        bytes: &[u8],
    ) -> Result<(), NimbusError> {
        let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
        let mut info = format!(
            "📊 *Media Information*\n\n• Type: {}\n• Size: {size_mb:.2} MB\n",
            media.kind
        );
        if let (Some(width), Some(height)) = (media.width, media.height) {
            info.push_str(&format!("• Dimensions: {width}x{height}\n"));
        }
        if let Some(seconds) = media.seconds {
            info.push_str(&format!("• Duration: {seconds}s\n"));
        }
        info.push_str(&format!(
            "• Caption: {}\n",
            media.caption.as_deref().unwrap_or("None")
        ));
        ctx.reply(info).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::rig;
    use nimbus_test_utils::EventBuilder;

    #[tokio::test]
    async fn logo_with_invalid_style_lists_samples() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".logo nosuchstyle hello").build())
            .await;
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Invalid logo style")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn logo_rejects_overlong_text() {
        let rig = rig();
        let long = "x".repeat(60);
        rig.dispatch(EventBuilder::dm().text(&format!(".logo glow {long}")).build())
            .await;
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Text too long")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn url_without_quoted_media_shows_tutorial_panel() {
        let rig = rig();
        rig.dispatch(EventBuilder::dm().text(".url").build()).await;
        let sent = rig.socket.sent_messages().await;
        assert!(sent.iter().any(|s| matches!(
            &s.payload,
            OutboundPayload::Buttons { title, .. } if title.contains("Media Uploader")
        )));
        assert!(rig.session.pending_actions().is_empty());
    }

    #[tokio::test]
    async fn url_with_quoted_media_stages_upload() {
        let rig = rig();
        let event = EventBuilder::dm()
            .text(".url")
            .quoted_media(MediaKind::Image)
            .build();
        rig.dispatch(event.clone()).await;

        assert!(matches!(
            rig.session.pending_actions().get(&event.sender),
            Some(StagedAction::Upload { .. })
        ));
    }

    #[tokio::test]
    async fn view_with_quoted_media_stages_bytes() {
        let rig = rig();
        let event = EventBuilder::dm()
            .text(".view")
            .quoted_media(MediaKind::Video)
            .build();
        rig.dispatch(event.clone()).await;

        assert!(matches!(
            rig.session.pending_actions().get(&event.sender),
            Some(StagedAction::MediaView { .. })
        ));
        let sent = rig.socket.sent_messages().await;
        assert!(sent.iter().any(|s| matches!(
            &s.payload,
            OutboundPayload::Buttons { title, .. } if title.contains("VIDEO Detected")
        )));
    }

    #[test]
    fn extensions_cover_all_kinds() {
        assert_eq!(extension_for(MediaKind::Image), "jpg");
        assert_eq!(extension_for(MediaKind::Audio), "mp3");
        assert_eq!(mimetype_for(MediaKind::Document), "application/octet-stream");
    }
}
