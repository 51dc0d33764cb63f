// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock protocol transport for deterministic testing.
//!
//! `MockSocket` captures outbound sends for assertion; `MockSocketFactory`
//! hands out mock sockets together with an event channel the test drives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use nimbus_core::{
    Credentials, GroupMetadata, Jid, MediaRef, NimbusError, OutboundPayload, ProtocolClient,
    SendOptions, SessionId, SocketEvent, SocketFactory,
};

/// One captured outbound send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: Jid,
    pub payload: OutboundPayload,
    pub options: SendOptions,
}

/// A mock [`ProtocolClient`] that records every send.
pub struct MockSocket {
    self_jid: Jid,
    sent: Mutex<Vec<SentMessage>>,
    fail_sends: AtomicBool,
    closed: AtomicBool,
    group: Mutex<Option<GroupMetadata>>,
    media_bytes: Mutex<Vec<u8>>,
}

impl MockSocket {
    pub fn new() -> Self {
        Self::with_self_jid("bot@s.whatsapp.net")
    }

    pub fn with_self_jid(jid: &str) -> Self {
        Self {
            self_jid: Jid::new(jid),
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            group: Mutex::new(None),
            media_bytes: Mutex::new(vec![0u8; 1024]),
        }
    }

    /// Script the metadata returned by `group_metadata`.
    pub async fn set_group_metadata(&self, metadata: GroupMetadata) {
        *self.group.lock().await = Some(metadata);
    }

    /// Script the bytes returned by `download_media`.
    pub async fn set_media_bytes(&self, bytes: Vec<u8>) {
        *self.media_bytes.lock().await = bytes;
    }

    /// Make every subsequent `send` return an error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// All sends captured so far.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Text bodies of captured `Text` payloads, in send order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match &s.payload {
                OutboundPayload::Text { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Emojis of captured `Reaction` payloads, in send order.
    pub async fn sent_reactions(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|s| match &s.payload {
                OutboundPayload::Reaction { emoji, .. } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for MockSocket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolClient for MockSocket {
    fn self_jid(&self) -> Jid {
        self.self_jid.clone()
    }

    async fn send(
        &self,
        to: &Jid,
        payload: OutboundPayload,
        options: SendOptions,
    ) -> Result<(), NimbusError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NimbusError::socket("mock send failure"));
        }
        self.sent.lock().await.push(SentMessage {
            to: to.clone(),
            payload,
            options,
        });
        Ok(())
    }

    async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, NimbusError> {
        match self.group.lock().await.clone() {
            Some(metadata) => Ok(metadata),
            None => Err(NimbusError::socket(format!(
                "no group metadata scripted for {group}"
            ))),
        }
    }

    async fn download_media(&self, _media: &MediaRef) -> Result<Vec<u8>, NimbusError> {
        Ok(self.media_bytes.lock().await.clone())
    }

    async fn close(&self) -> Result<(), NimbusError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// One established mock connection, exposed to the test for driving events.
#[derive(Clone)]
pub struct MockConnection {
    pub session_id: SessionId,
    pub credentials: Credentials,
    pub socket: Arc<MockSocket>,
    pub events: mpsc::Sender<SocketEvent>,
}

/// A scripted [`SocketFactory`].
///
/// Each `connect` call hands back a fresh [`MockSocket`] and stores a
/// [`MockConnection`] the test can use to push [`SocketEvent`]s. Failures
/// can be queued ahead of time with [`MockSocketFactory::push_connect_error`].
pub struct MockSocketFactory {
    connections: Mutex<Vec<MockConnection>>,
    scripted_errors: Mutex<VecDeque<NimbusError>>,
    connect_count: AtomicUsize,
}

impl MockSocketFactory {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Vec::new()),
            scripted_errors: Mutex::new(VecDeque::new()),
            connect_count: AtomicUsize::new(0),
        }
    }

    /// Queue an error to be returned by the next `connect` call.
    pub async fn push_connect_error(&self, error: NimbusError) {
        self.scripted_errors.lock().await.push_back(error);
    }

    /// Number of `connect` calls made so far.
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// All connections established so far, oldest first.
    pub async fn connections(&self) -> Vec<MockConnection> {
        self.connections.lock().await.clone()
    }

    /// The most recent connection, if any.
    pub async fn last_connection(&self) -> Option<MockConnection> {
        self.connections.lock().await.last().cloned()
    }

    /// Wait until at least `n` connections have been made.
    pub async fn wait_for_connections(&self, n: usize) -> Vec<MockConnection> {
        loop {
            {
                let conns = self.connections.lock().await;
                if conns.len() >= n {
                    return conns.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

impl Default for MockSocketFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SocketFactory for MockSocketFactory {
    async fn connect(
        &self,
        session_id: &SessionId,
        credentials: Credentials,
    ) -> Result<(Arc<dyn ProtocolClient>, mpsc::Receiver<SocketEvent>), NimbusError> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.scripted_errors.lock().await.pop_front() {
            return Err(err);
        }

        let socket = Arc::new(MockSocket::new());
        let (tx, rx) = mpsc::channel(64);
        self.connections.lock().await.push(MockConnection {
            session_id: session_id.clone(),
            credentials,
            socket: socket.clone(),
            events: tx,
        });
        Ok((socket, rx))
    }
}
