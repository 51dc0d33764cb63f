// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for inbound events used across router and session tests.

use nimbus_core::{InboundEvent, Jid, MediaKind, MediaRef, MessageContent, MessageKey};

static EVENT_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

fn next_id() -> String {
    let n = EVENT_SEQ.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    format!("MSG-{n}")
}

/// Builder for [`InboundEvent`] with direct-message defaults.
pub struct EventBuilder {
    from: Jid,
    sender: Jid,
    is_group: bool,
    is_self: bool,
    push_name: String,
    content: MessageContent,
    view_once: bool,
    quoted_media: Option<MediaRef>,
}

impl EventBuilder {
    /// A direct message from the default test user.
    pub fn dm() -> Self {
        let jid = Jid::new("254712345678@s.whatsapp.net");
        Self {
            from: jid.clone(),
            sender: jid,
            is_group: false,
            is_self: false,
            push_name: "Test User".into(),
            content: MessageContent::Text(String::new()),
            view_once: false,
            quoted_media: None,
        }
    }

    /// A group message; `sender` is the participant, `from` the group.
    pub fn group() -> Self {
        let mut b = Self::dm();
        b.from = Jid::new("120363041234567890@g.us");
        b.is_group = true;
        b
    }

    /// A status broadcast event.
    pub fn status() -> Self {
        let mut b = Self::dm();
        b.from = Jid::new("status@broadcast");
        b
    }

    pub fn from(mut self, jid: &str) -> Self {
        self.from = Jid::new(jid);
        self
    }

    pub fn sender(mut self, jid: &str) -> Self {
        self.sender = Jid::new(jid);
        self
    }

    pub fn from_self(mut self) -> Self {
        self.is_self = true;
        self
    }

    pub fn push_name(mut self, name: &str) -> Self {
        self.push_name = name.into();
        self
    }

    pub fn text(mut self, body: &str) -> Self {
        self.content = MessageContent::Text(body.into());
        self
    }

    pub fn button_reply(mut self, id: &str) -> Self {
        self.content = MessageContent::ButtonReply { id: id.into() };
        self
    }

    pub fn list_reply(mut self, id: &str) -> Self {
        self.content = MessageContent::ListReply { id: id.into() };
        self
    }

    pub fn media(mut self, kind: MediaKind, caption: Option<&str>) -> Self {
        self.content = MessageContent::Media(MediaRef {
            kind,
            caption: caption.map(String::from),
            size_bytes: Some(2048),
            width: Some(640),
            height: Some(480),
            seconds: None,
            url: Some("https://cdn.example/media".into()),
        });
        self
    }

    pub fn quoted_media(mut self, kind: MediaKind) -> Self {
        self.quoted_media = Some(MediaRef {
            kind,
            caption: None,
            size_bytes: Some(4096),
            width: None,
            height: None,
            seconds: None,
            url: Some("https://cdn.example/quoted".into()),
        });
        self
    }

    pub fn view_once(mut self) -> Self {
        self.view_once = true;
        self
    }

    pub fn build(self) -> InboundEvent {
        let participant = if self.is_group {
            Some(self.sender.clone())
        } else {
            None
        };
        InboundEvent {
            key: MessageKey {
                id: next_id(),
                remote_jid: self.from.clone(),
                from_me: self.is_self,
                participant,
            },
            from: self.from,
            sender: self.sender,
            is_group: self.is_group,
            is_self: self.is_self,
            push_name: self.push_name,
            content: self.content,
            view_once: self.view_once,
            quoted_media: self.quoted_media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dm_defaults() {
        let event = EventBuilder::dm().text("hi").build();
        assert!(!event.is_group);
        assert_eq!(event.from, event.sender);
        assert_eq!(event.extracted_text(), Some("hi"));
    }

    #[test]
    fn group_has_participant() {
        let event = EventBuilder::group().text("hi").build();
        assert!(event.is_group);
        assert!(event.key.participant.is_some());
        assert!(event.from.is_group());
    }

    #[test]
    fn status_broadcast_jid() {
        let event = EventBuilder::status().build();
        assert!(event.from.is_status_broadcast());
    }

    #[test]
    fn event_ids_are_unique() {
        let a = EventBuilder::dm().build();
        let b = EventBuilder::dm().build();
        assert_ne!(a.key.id, b.key.id);
    }
}
