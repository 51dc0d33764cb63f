// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol client trait: the WhatsApp transport as a black-box socket.
//!
//! The protocol framing, encryption, and multi-device sync live entirely
//! behind this seam. A [`SocketFactory`] yields a connected client plus an
//! event stream; the supervisor owns both for the life of the session.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::NimbusError;
use crate::types::{
    Credentials, GroupMetadata, InboundEvent, Jid, MediaRef, OutboundPayload, SendOptions,
    SessionId,
};

/// Why the transport closed the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The account was unlinked; the session is terminal.
    LoggedOut,
    ConnectionLost,
    ConnectionClosed,
    TimedOut,
    /// Any other transport status code.
    Other(u16),
}

impl DisconnectReason {
    /// Whether the supervisor may schedule a reconnect for this close.
    pub fn should_reconnect(&self) -> bool {
        !matches!(self, DisconnectReason::LoggedOut)
    }
}

/// Connection-state transitions reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionUpdate {
    Connecting,
    Open,
    Close { reason: DisconnectReason },
}

/// One event emitted by the transport to its owning supervisor.
#[derive(Debug, Clone)]
pub enum SocketEvent {
    /// The protocol rotated keys; the new blob must be persisted.
    CredentialsUpdated(Credentials),
    Connection(ConnectionUpdate),
    Message(InboundEvent),
}

/// An authenticated WhatsApp transport for one session.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// The jid this session is linked as.
    fn self_jid(&self) -> Jid;

    /// Transmit one payload to a chat.
    async fn send(
        &self,
        to: &Jid,
        payload: OutboundPayload,
        options: SendOptions,
    ) -> Result<(), NimbusError>;

    /// Fetch metadata for a group chat (subject, participants, roles).
    async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, NimbusError>;

    /// Download the bytes behind a media reference.
    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, NimbusError>;

    /// Close the underlying transport.
    async fn close(&self) -> Result<(), NimbusError>;
}

/// Constructs protocol clients. The supervisor calls this on every
/// connect and reconnect attempt.
#[async_trait]
pub trait SocketFactory: Send + Sync {
    async fn connect(
        &self,
        session_id: &SessionId,
        credentials: Credentials,
    ) -> Result<(std::sync::Arc<dyn ProtocolClient>, mpsc::Receiver<SocketEvent>), NimbusError>;
}
