// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam for deployments without a wired protocol backend.
//!
//! The supervisor, router, and gateway are all written against the
//! [`SocketFactory`] and [`PairingTransport`] traits; the actual WhatsApp
//! multi-device protocol lives in an external implementation that
//! deployments link in. This placeholder keeps the binary honest: every
//! transport-touching call fails with a clear message instead of
//! pretending to connect.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use nimbus_core::{Credentials, NimbusError, ProtocolClient, SessionId, SocketEvent, SocketFactory};
use nimbus_gateway::PairingTransport;

const NOT_CONFIGURED: &str =
    "no WhatsApp transport configured; link a SocketFactory implementation";

/// A factory that fails every operation with a configuration error.
pub struct UnconfiguredTransport;

#[async_trait]
impl SocketFactory for UnconfiguredTransport {
    async fn connect(
        &self,
        _session_id: &SessionId,
        _credentials: Credentials,
    ) -> Result<(Arc<dyn ProtocolClient>, mpsc::Receiver<SocketEvent>), NimbusError> {
        Err(NimbusError::socket(NOT_CONFIGURED))
    }
}

#[async_trait]
impl PairingTransport for UnconfiguredTransport {
    async fn begin_qr(&self, _session_id: &SessionId) -> Result<String, NimbusError> {
        Err(NimbusError::socket(NOT_CONFIGURED))
    }

    async fn pairing_code(
        &self,
        _session_id: &SessionId,
        _phone: &str,
    ) -> Result<String, NimbusError> {
        Err(NimbusError::socket(NOT_CONFIGURED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_operation_reports_missing_transport() {
        let transport = UnconfiguredTransport;
        let id = SessionId("s1".into());

        let err = transport
            .connect(&id, Credentials::empty())
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("no WhatsApp transport"));

        let err = transport.begin_qr(&id).await.unwrap_err();
        assert!(err.to_string().contains("no WhatsApp transport"));
    }
}
