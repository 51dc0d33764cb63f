// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Nimbus workspace.
//!
//! Inbound WhatsApp envelopes are normalized ONCE at the socket boundary
//! into [`InboundEvent`] with a [`MessageContent`] tagged union, so the
//! router pattern-matches instead of probing nested optional fields.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The reserved address WhatsApp uses for status updates.
pub const STATUS_BROADCAST_JID: &str = "status@broadcast";

/// Unique identifier for one linked bot session, generated at pairing time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WhatsApp addressing identifier for a user, group, or broadcast channel.
///
/// Device suffixes (`254700000001:12@s.whatsapp.net`) are stripped on
/// construction so the same user always compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jid(String);

impl Jid {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match raw.split_once('@') {
            Some((user, server)) => {
                let user = user.split(':').next().unwrap_or(user);
                Jid(format!("{user}@{server}"))
            }
            None => Jid(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The user part before `@`, e.g. the phone number.
    pub fn user(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    pub fn is_group(&self) -> bool {
        self.0.ends_with("@g.us")
    }

    pub fn is_status_broadcast(&self) -> bool {
        self.0 == STATUS_BROADCAST_JID
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection state of one supervised session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
    Stopped,
}

/// Opaque credential blob owned by the protocol client and persisted by the
/// session store. Mutated by the transport on every key rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub creds: serde_json::Value,
    pub keys: serde_json::Value,
}

impl Credentials {
    /// Fresh credentials for a never-paired session.
    pub fn empty() -> Self {
        Self {
            creds: serde_json::Value::Null,
            keys: serde_json::Value::Null,
        }
    }

    /// True when this blob has never been through pairing.
    pub fn is_empty(&self) -> bool {
        self.creds.is_null()
    }
}

/// Identity of one received message, used to quote and react to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub id: String,
    pub remote_jid: Jid,
    pub from_me: bool,
    pub participant: Option<Jid>,
}

/// Media category carried by a media message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

/// Reference to a media payload, enough to display and re-upload it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub caption: Option<String>,
    pub size_bytes: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub seconds: Option<u32>,
    /// Download URL resolved by the transport, when available.
    pub url: Option<String>,
}

/// Content of one inbound event, decided once at the transport boundary.
///
/// Exactly one variant applies per event; the router never re-probes the
/// raw envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    /// Structured reply to a template/buttons message.
    ButtonReply { id: String },
    /// Structured reply to an interactive list message.
    ListReply { id: String },
    Media(MediaRef),
    Unknown,
}

/// Normalized representation of one received WhatsApp event.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub key: MessageKey,
    /// The chat this event arrived in (user DM or group).
    pub from: Jid,
    /// The author of the event.
    pub sender: Jid,
    pub is_group: bool,
    pub is_self: bool,
    pub push_name: String,
    pub content: MessageContent,
    /// Flattened view-once wrapper, when the transport unwrapped one.
    pub view_once: bool,
    /// The quoted (replied-to) media, when the event is a reply to media.
    pub quoted_media: Option<MediaRef>,
}

impl InboundEvent {
    /// Plain text carried by this event, or `None` for button/list replies
    /// and captionless media.
    pub fn extracted_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Media(media) => media.caption.as_deref(),
            MessageContent::ButtonReply { .. }
            | MessageContent::ListReply { .. }
            | MessageContent::Unknown => None,
        }
    }

    /// Structured button/list id carried by this event, if any.
    pub fn structured_button_id(&self) -> Option<&str> {
        match &self.content {
            MessageContent::ButtonReply { id } | MessageContent::ListReply { id } => Some(id),
            _ => None,
        }
    }
}

/// One member of a group chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub jid: Jid,
    pub name: Option<String>,
    pub is_admin: bool,
}

/// Metadata for a group chat as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMetadata {
    pub jid: Jid,
    pub subject: String,
    pub participants: Vec<GroupMember>,
}

impl GroupMetadata {
    /// Members holding an admin role.
    pub fn admins(&self) -> Vec<GroupMember> {
        self.participants
            .iter()
            .filter(|p| p.is_admin)
            .cloned()
            .collect()
    }

    /// Members without an admin role.
    pub fn regular_members(&self) -> Vec<GroupMember> {
        self.participants
            .iter()
            .filter(|p| !p.is_admin)
            .cloned()
            .collect()
    }

    /// Whether `jid` is an admin of this group.
    pub fn is_admin(&self, jid: &Jid) -> bool {
        self.participants
            .iter()
            .any(|p| p.is_admin && p.jid == *jid)
    }
}

/// One interactive button offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: String,
    pub text: String,
}

impl Button {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Outbound send payloads accepted by the protocol client.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    Text {
        text: String,
    },
    Reaction {
        emoji: String,
        key: MessageKey,
    },
    Buttons {
        title: String,
        text: String,
        footer: String,
        buttons: Vec<Button>,
    },
    Image {
        url: String,
        caption: String,
    },
    Audio {
        url: String,
        file_name: String,
    },
    Document {
        file_name: String,
        mimetype: String,
        content: Vec<u8>,
        caption: String,
    },
    /// Text with explicit @-mentions (group tagging).
    Mentions {
        text: String,
        mentions: Vec<Jid>,
    },
}

/// Per-send options.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Quote this message in the reply.
    pub quoted: Option<MessageKey>,
    /// Status reactions must name the jids allowed to see them.
    pub status_jid_list: Vec<Jid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jid_strips_device_suffix() {
        let jid = Jid::new("254712345678:12@s.whatsapp.net");
        assert_eq!(jid.as_str(), "254712345678@s.whatsapp.net");
        assert_eq!(jid.user(), "254712345678");
    }

    #[test]
    fn jid_without_server_passes_through() {
        let jid = Jid::new("status@broadcast");
        assert!(jid.is_status_broadcast());
        assert!(!jid.is_group());
    }

    #[test]
    fn group_jid_detection() {
        assert!(Jid::new("1203630@g.us").is_group());
        assert!(!Jid::new("254712345678@s.whatsapp.net").is_group());
    }

    #[test]
    fn extracted_text_prefers_caption_for_media() {
        let event = event_with_content(MessageContent::Media(MediaRef {
            kind: MediaKind::Image,
            caption: Some("look".into()),
            size_bytes: None,
            width: None,
            height: None,
            seconds: None,
            url: None,
        }));
        assert_eq!(event.extracted_text(), Some("look"));
    }

    #[test]
    fn button_reply_has_no_extracted_text() {
        let event = event_with_content(MessageContent::ButtonReply {
            id: "btn_ping".into(),
        });
        assert_eq!(event.extracted_text(), None);
        assert_eq!(event.structured_button_id(), Some("btn_ping"));
    }

    #[test]
    fn connection_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Stopped.to_string(), "stopped");
    }

    fn event_with_content(content: MessageContent) -> InboundEvent {
        let jid = Jid::new("254712345678@s.whatsapp.net");
        InboundEvent {
            key: MessageKey {
                id: "ABC".into(),
                remote_jid: jid.clone(),
                from_me: false,
                participant: None,
            },
            from: jid.clone(),
            sender: jid,
            is_group: false,
            is_self: false,
            push_name: "User".into(),
            content,
            view_once: false,
            quoted_media: None,
        }
    }
}
