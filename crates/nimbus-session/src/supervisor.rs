// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection supervision for one bot session.
//!
//! [`ConnectionSupervisor`] owns the transport for a session and its event
//! loop. Disconnects that are not a logout are retried with a linearly
//! growing delay, `base_delay_ms * attempt` capped at `max_delay_ms`, up
//! to `max_reconnect_attempts`; a logout or exhausted attempts stop the
//! session for good. Inbound messages are handed to the injected
//! [`MessageDispatcher`], which owns all routing.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use nimbus_config::{BotConfig, ConnectionConfig};
use nimbus_core::{
    ConnectionState, ConnectionUpdate, Credentials, DisconnectReason, InboundEvent, NimbusError,
    OutboundPayload, ProtocolClient, SendOptions, SessionId, SessionStore, SocketEvent,
    SocketFactory,
};

use crate::pending::PendingActionCache;
use crate::registry::BotSessionRegistry;
use crate::user_state::UserStateStore;

/// Consumer of inbound messages for a running session.
///
/// Dispatch owns its own error handling; failures must not propagate into
/// the supervision loop.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        session: Arc<ConnectionSupervisor>,
        event: InboundEvent,
        socket: Arc<dyn ProtocolClient>,
    );
}

/// Atomic cell for the session's [`ConnectionState`].
struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(Self::encode(state)))
    }

    fn encode(state: ConnectionState) -> u8 {
        match state {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
            ConnectionState::Error => 3,
            ConnectionState::Stopped => 4,
        }
    }

    fn get(&self) -> ConnectionState {
        match self.0.load(Ordering::SeqCst) {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Error,
            4 => ConnectionState::Stopped,
            _ => ConnectionState::Disconnected,
        }
    }

    fn set(&self, state: ConnectionState) {
        self.0.store(Self::encode(state), Ordering::SeqCst);
    }
}

/// Supervises the connection lifecycle of one bot session.
pub struct ConnectionSupervisor {
    session_id: SessionId,
    connection: ConnectionConfig,
    bot: BotConfig,
    factory: Arc<dyn SocketFactory>,
    store: Arc<dyn SessionStore>,
    registry: Arc<BotSessionRegistry>,
    dispatcher: Arc<dyn MessageDispatcher>,

    state: StateCell,
    credentials: Mutex<Credentials>,
    socket: Mutex<Option<Arc<dyn ProtocolClient>>>,
    running: AtomicBool,
    reconnect_attempts: AtomicU32,
    started_at: DateTime<Utc>,

    user_states: UserStateStore,
    pending_actions: PendingActionCache,
    auto_react: AtomicBool,
    auto_status_react: AtomicBool,
    last_stk_reference: Mutex<Option<String>>,
}

impl ConnectionSupervisor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        credentials: Credentials,
        connection: ConnectionConfig,
        bot: BotConfig,
        factory: Arc<dyn SocketFactory>,
        store: Arc<dyn SessionStore>,
        registry: Arc<BotSessionRegistry>,
        dispatcher: Arc<dyn MessageDispatcher>,
    ) -> Arc<Self> {
        let auto_react = bot.auto_react;
        let auto_status_react = bot.auto_status_react;
        Arc::new(Self {
            session_id,
            connection,
            bot,
            factory,
            store,
            registry,
            dispatcher,
            state: StateCell::new(ConnectionState::Disconnected),
            credentials: Mutex::new(credentials),
            socket: Mutex::new(None),
            running: AtomicBool::new(false),
            reconnect_attempts: AtomicU32::new(0),
            started_at: Utc::now(),
            user_states: UserStateStore::new(),
            pending_actions: PendingActionCache::new(),
            auto_react: AtomicBool::new(auto_react),
            auto_status_react: AtomicBool::new(auto_status_react),
            last_stk_reference: Mutex::new(None),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::SeqCst)
    }

    pub fn max_reconnect_attempts(&self) -> u32 {
        self.connection.max_reconnect_attempts
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Uptime formatted as `<h>h <m>m`.
    pub fn uptime(&self) -> String {
        let elapsed = Utc::now() - self.started_at;
        let hours = elapsed.num_hours();
        let minutes = elapsed.num_minutes() % 60;
        format!("{hours}h {minutes}m")
    }

    pub fn bot_config(&self) -> &BotConfig {
        &self.bot
    }

    pub fn user_states(&self) -> &UserStateStore {
        &self.user_states
    }

    pub fn pending_actions(&self) -> &PendingActionCache {
        &self.pending_actions
    }

    pub fn auto_react_enabled(&self) -> bool {
        self.auto_react.load(Ordering::SeqCst)
    }

    pub fn set_auto_react(&self, enabled: bool) {
        self.auto_react.store(enabled, Ordering::SeqCst);
    }

    pub fn auto_status_react_enabled(&self) -> bool {
        self.auto_status_react.load(Ordering::SeqCst)
    }

    pub fn set_auto_status_react(&self, enabled: bool) {
        self.auto_status_react.store(enabled, Ordering::SeqCst);
    }

    pub async fn last_stk_reference(&self) -> Option<String> {
        self.last_stk_reference.lock().await.clone()
    }

    pub async fn set_last_stk_reference(&self, reference: String) {
        *self.last_stk_reference.lock().await = Some(reference);
    }

    /// The current transport, when connected.
    pub async fn socket(&self) -> Option<Arc<dyn ProtocolClient>> {
        self.socket.lock().await.clone()
    }

    /// Start the session.
    ///
    /// A session that is already connecting or connected is left alone and
    /// `Ok` is returned. Credentials are loaded from the store when the
    /// supervisor was created without any.
    pub async fn start(self: &Arc<Self>) -> Result<(), NimbusError> {
        match self.state.get() {
            ConnectionState::Connecting | ConnectionState::Connected => {
                info!(session_id = %self.session_id, state = %self.state.get(),
                    "session already active, ignoring start");
                return Ok(());
            }
            _ => {}
        }
        self.state.set(ConnectionState::Connecting);
        info!(session_id = %self.session_id, "starting session");

        {
            let mut credentials = self.credentials.lock().await;
            if credentials.is_empty() {
                if let Some(saved) = self.store.get(&self.session_id).await? {
                    debug!(session_id = %self.session_id, "loaded credentials from store");
                    *credentials = saved;
                }
            }
        }

        let credentials = self.credentials.lock().await.clone();
        let (socket, events) = match self.factory.connect(&self.session_id, credentials).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "failed to start session");
                self.state.set(ConnectionState::Error);
                return Err(e);
            }
        };

        *self.socket.lock().await = Some(socket);
        self.registry.insert(self.clone());
        self.running.store(true, Ordering::SeqCst);
        self.reconnect_attempts.store(0, Ordering::SeqCst);

        let supervisor = self.clone();
        tokio::spawn(async move {
            supervisor.run_event_loop(events).await;
        });

        info!(session_id = %self.session_id, "session started");
        Ok(())
    }

    /// Stop the session: close the transport, drop registry and per-user
    /// state. Close errors are ignored.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.state.set(ConnectionState::Stopped);

        if let Some(socket) = self.socket.lock().await.take() {
            let _ = socket.close().await;
        }

        self.registry.remove(&self.session_id);
        self.user_states.clear();
        self.pending_actions.clear();

        info!(session_id = %self.session_id, "session stopped");
    }

    async fn run_event_loop(self: Arc<Self>, mut events: mpsc::Receiver<SocketEvent>) {
        loop {
            let event = match events.recv().await {
                Some(event) => event,
                None => {
                    // Transport task dropped the channel without a close
                    // event. Treat it as an orderly close.
                    debug!(session_id = %self.session_id, "event channel closed");
                    match self.on_close(DisconnectReason::ConnectionClosed).await {
                        Some(next) => {
                            events = next;
                            continue;
                        }
                        None => return,
                    }
                }
            };

            match event {
                SocketEvent::CredentialsUpdated(credentials) => {
                    *self.credentials.lock().await = credentials.clone();
                    if let Err(e) = self.store.save(&self.session_id, &credentials).await {
                        warn!(session_id = %self.session_id, error = %e,
                            "failed to persist rotated credentials");
                    } else {
                        debug!(session_id = %self.session_id, "persisted rotated credentials");
                    }
                }
                SocketEvent::Connection(ConnectionUpdate::Connecting) => {
                    self.state.set(ConnectionState::Connecting);
                }
                SocketEvent::Connection(ConnectionUpdate::Open) => {
                    self.state.set(ConnectionState::Connected);
                    self.reconnect_attempts.store(0, Ordering::SeqCst);
                    info!(session_id = %self.session_id, "session connected");

                    let credentials = self.credentials.lock().await.clone();
                    if let Err(e) = self.store.save(&self.session_id, &credentials).await {
                        warn!(session_id = %self.session_id, error = %e,
                            "failed to persist credentials on connect");
                    }

                    if self.bot.welcome_message {
                        self.send_welcome().await;
                    }
                }
                SocketEvent::Connection(ConnectionUpdate::Close { reason }) => {
                    match self.on_close(reason).await {
                        Some(next) => events = next,
                        None => return,
                    }
                }
                SocketEvent::Message(inbound) => {
                    let socket = self.socket.lock().await.clone();
                    if let Some(socket) = socket {
                        self.dispatcher
                            .dispatch(self.clone(), inbound, socket)
                            .await;
                    }
                }
            }
        }
    }

    /// Handle a transport close: schedule reconnects for non-terminal
    /// reasons, stop otherwise. Returns the new event stream when a
    /// reconnect succeeded.
    async fn on_close(&self, reason: DisconnectReason) -> Option<mpsc::Receiver<SocketEvent>> {
        self.state.set(ConnectionState::Disconnected);

        if !reason.should_reconnect() {
            info!(session_id = %self.session_id, ?reason, "terminal disconnect, stopping");
            self.stop().await;
            return None;
        }

        loop {
            let attempts = self.reconnect_attempts.load(Ordering::SeqCst);
            if attempts >= self.connection.max_reconnect_attempts {
                info!(session_id = %self.session_id, attempts,
                    "reconnect attempts exhausted, stopping");
                self.stop().await;
                return None;
            }

            let attempt = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let delay = Duration::from_millis(
                (self.connection.base_delay_ms * u64::from(attempt))
                    .min(self.connection.max_delay_ms),
            );
            info!(session_id = %self.session_id, attempt,
                max = self.connection.max_reconnect_attempts,
                delay_ms = delay.as_millis() as u64, "scheduling reconnect");

            tokio::time::sleep(delay).await;

            if !self.running.load(Ordering::SeqCst) {
                return None;
            }

            if let Some(old) = self.socket.lock().await.take() {
                let _ = old.close().await;
            }
            self.state.set(ConnectionState::Connecting);

            let credentials = self.credentials.lock().await.clone();
            match self.factory.connect(&self.session_id, credentials).await {
                Ok((socket, events)) => {
                    *self.socket.lock().await = Some(socket);
                    return Some(events);
                }
                Err(e) => {
                    warn!(session_id = %self.session_id, attempt, error = %e,
                        "reconnect attempt failed");
                    self.state.set(ConnectionState::Error);
                }
            }
        }
    }

    /// Best-effort hello to self after connecting.
    async fn send_welcome(&self) {
        let socket = match self.socket.lock().await.clone() {
            Some(socket) => socket,
            None => return,
        };
        let text = format!(
            "{} is ready!\nSession: {}\nPrefix: {}\nUse {}menu for commands",
            self.bot.name, self.session_id, self.bot.prefix, self.bot.prefix
        );
        let self_jid = socket.self_jid();
        let _ = socket
            .send(
                &self_jid,
                OutboundPayload::Text { text },
                SendOptions::default(),
            )
            .await;
    }
}
