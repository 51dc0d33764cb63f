// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Nimbus WhatsApp bot runner.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Nimbus workspace. The protocol
//! transport, session store, and command handlers all plug in through the
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NimbusError;
pub use types::{
    Button, ConnectionState, Credentials, GroupMember, GroupMetadata, InboundEvent, Jid,
    MediaKind, MediaRef, MessageContent, MessageKey, OutboundPayload, SendOptions, SessionId,
};

pub use traits::{
    CommandContext, CommandHandler, ConnectionUpdate, DisconnectReason, ProtocolClient,
    SessionStore, SocketEvent, SocketFactory,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = NimbusError::Config("bad".into());
        let _storage = NimbusError::Storage {
            source: Box::new(std::io::Error::other("io")),
        };
        let _socket = NimbusError::socket("closed");
        let _active = NimbusError::AlreadyActive {
            session_id: "s1".into(),
        };
        let _missing = NimbusError::SessionNotFound {
            session_id: "s1".into(),
        };
        let _handler = NimbusError::HandlerNotFound { name: "ping".into() };
        let _api = NimbusError::api("503");
        let _timeout = NimbusError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _validation = NimbusError::Validation("bad phone".into());
        let _internal = NimbusError::Internal("bug".into());
    }

    #[test]
    fn logout_is_terminal() {
        assert!(!DisconnectReason::LoggedOut.should_reconnect());
        assert!(DisconnectReason::ConnectionLost.should_reconnect());
        assert!(DisconnectReason::Other(428).should_reconnect());
    }

    #[test]
    fn empty_credentials_round_trip() {
        let creds = Credentials::empty();
        assert!(creds.is_empty());
        let json = serde_json::to_string(&creds).expect("serialize");
        let parsed: Credentials = serde_json::from_str(&json).expect("deserialize");
        assert!(parsed.is_empty());
    }
}
