// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the session-to-router pipeline.
//!
//! Each test wires a real SQLite store, the real router, and a mock
//! transport, then drives socket events the way a live connection would.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use nimbus_config::{BotConfig, ConnectionConfig};
use nimbus_core::{
    ConnectionState, ConnectionUpdate, Credentials, OutboundPayload, SessionId, SessionStore,
    SocketEvent,
};
use nimbus_payments::PaymentClient;
use nimbus_plugin::CommandRegistry;
use nimbus_router::MessageRouter;
use nimbus_session::{BotSessionRegistry, ConnectionSupervisor, Pending};
use nimbus_storage::SqliteSessionStore;
use nimbus_test_utils::{EventBuilder, MockConnection, MockSocketFactory};

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<SqliteSessionStore>,
    factory: Arc<MockSocketFactory>,
    registry: Arc<BotSessionRegistry>,
    supervisor: Arc<ConnectionSupervisor>,
}

impl Harness {
    async fn new(id: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sessions.db");
        let store = Arc::new(
            SqliteSessionStore::open(path.to_str().expect("utf8 path"))
                .await
                .expect("open store"),
        );
        let factory = Arc::new(MockSocketFactory::new());
        let registry = Arc::new(BotSessionRegistry::new());
        let payments = Arc::new(
            PaymentClient::new(&nimbus_config::PaymentsConfig::default()).expect("client"),
        );
        let router = Arc::new(MessageRouter::new(CommandRegistry::new(), payments));

        // Reactions off so each test asserts exactly the sends it expects.
        let bot = BotConfig {
            auto_react: false,
            auto_status_react: true,
            welcome_message: false,
            ..BotConfig::default()
        };
        let connection = ConnectionConfig {
            max_reconnect_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 40,
        };
        let supervisor = ConnectionSupervisor::new(
            SessionId(id.into()),
            Credentials::empty(),
            connection,
            bot,
            factory.clone(),
            store.clone(),
            registry.clone(),
            router,
        );
        Self {
            _dir: dir,
            store,
            factory,
            registry,
            supervisor,
        }
    }

    /// Start the supervisor and bring the mock connection to Open.
    async fn start_connected(&self) -> MockConnection {
        self.supervisor.start().await.expect("start");
        let conn = self.factory.last_connection().await.expect("connection");
        conn.events
            .send(SocketEvent::Connection(ConnectionUpdate::Open))
            .await
            .expect("open");
        timeout(Duration::from_secs(2), async {
            while self.supervisor.state() != ConnectionState::Connected {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("connected");
        conn
    }
}

async fn wait_for_text(conn: &MockConnection, needle: &str) -> Vec<String> {
    timeout(Duration::from_secs(2), async {
        loop {
            let texts = conn.socket.sent_texts().await;
            if texts.iter().any(|t| t.contains(needle)) {
                return texts;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no reply containing {needle:?}"))
}

#[tokio::test]
async fn ping_command_round_trips_through_the_pipeline() {
    let h = Harness::new("e2e-ping").await;
    let conn = h.start_connected().await;

    conn.events
        .send(SocketEvent::Message(
            EventBuilder::dm().text(".ping").build(),
        ))
        .await
        .expect("message");

    wait_for_text(&conn, "Pong").await;
}

#[tokio::test]
async fn rotated_credentials_land_in_sqlite() {
    let h = Harness::new("e2e-creds").await;
    let conn = h.start_connected().await;

    let rotated = Credentials {
        creds: serde_json::json!({"noise_key": "rotated"}),
        keys: serde_json::Value::Null,
    };
    conn.events
        .send(SocketEvent::CredentialsUpdated(rotated.clone()))
        .await
        .expect("rotate");

    let id = SessionId("e2e-creds".into());
    timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(Some(stored)) = h.store.get(&id).await {
                if stored == rotated {
                    return;
                }
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("credentials persisted");
}

#[tokio::test]
async fn button_reply_is_acked_then_executed() {
    let h = Harness::new("e2e-button").await;
    let conn = h.start_connected().await;

    conn.events
        .send(SocketEvent::Message(
            EventBuilder::dm().button_reply("btn_ping").build(),
        ))
        .await
        .expect("button");

    wait_for_text(&conn, "Pong").await;
    assert!(conn
        .socket
        .sent_reactions()
        .await
        .contains(&"✅".to_string()));
}

#[tokio::test]
async fn prefix_command_breaks_out_of_a_pending_flow() {
    let h = Harness::new("e2e-breakout").await;
    let conn = h.start_connected().await;

    // The tx-check button parks the user in a reference-entry flow.
    let press = EventBuilder::dm().button_reply("btn_check_tx").build();
    let user = press.sender.clone();
    conn.events
        .send(SocketEvent::Message(press))
        .await
        .expect("button");
    wait_for_text(&conn, "transaction reference").await;
    assert_eq!(
        h.supervisor.user_states().get(&user),
        Some(Pending::TxReference)
    );

    // A prefixed command escapes the flow instead of being consumed by it.
    conn.events
        .send(SocketEvent::Message(
            EventBuilder::dm().text(".ping").build(),
        ))
        .await
        .expect("message");
    wait_for_text(&conn, "Pong").await;
    assert_eq!(h.supervisor.user_states().get(&user), None);
}

#[tokio::test]
async fn status_broadcast_gets_a_reaction_and_nothing_else() {
    let h = Harness::new("e2e-status").await;
    let conn = h.start_connected().await;

    conn.events
        .send(SocketEvent::Message(EventBuilder::status().build()))
        .await
        .expect("status");

    timeout(Duration::from_secs(2), async {
        while conn.socket.sent_reactions().await.is_empty() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("status reaction");
    assert!(conn.socket.sent_texts().await.is_empty());
}

#[tokio::test]
async fn stop_tears_the_session_down() {
    let h = Harness::new("e2e-stop").await;
    let conn = h.start_connected().await;
    let id = SessionId("e2e-stop".into());
    assert!(h.registry.contains(&id));

    h.supervisor.stop().await;

    assert_eq!(h.supervisor.state(), ConnectionState::Stopped);
    assert!(!h.registry.contains(&id));
    assert!(conn.socket.is_closed());
    assert!(h.supervisor.user_states().is_empty());
}

#[tokio::test]
async fn commands_still_work_after_a_reconnect() {
    let h = Harness::new("e2e-reconnect").await;
    let conn = h.start_connected().await;

    conn.events
        .send(SocketEvent::Connection(ConnectionUpdate::Close {
            reason: nimbus_core::DisconnectReason::ConnectionLost,
        }))
        .await
        .expect("close");

    // The supervisor dials again; the second connection carries traffic.
    let conns = h.factory.wait_for_connections(2).await;
    let second = conns.last().expect("reconnect").clone();
    second
        .events
        .send(SocketEvent::Connection(ConnectionUpdate::Open))
        .await
        .expect("open");
    second
        .events
        .send(SocketEvent::Message(
            EventBuilder::dm().text(".ping").build(),
        ))
        .await
        .expect("message");

    wait_for_text(&second, "Pong").await;
}
