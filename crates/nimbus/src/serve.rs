// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nimbus serve` command implementation.
//!
//! Wires the session store, payment client, message router, and HTTP
//! gateway together, resumes sessions with stored credentials, and runs
//! until a shutdown signal arrives. Session expiry is swept in a
//! background task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use nimbus_config::NimbusConfig;
use nimbus_core::{Credentials, NimbusError, SocketFactory};
use nimbus_gateway::{GatewayState, PairingTransport};
use nimbus_payments::PaymentClient;
use nimbus_plugin::CommandRegistry;
use nimbus_router::MessageRouter;
use nimbus_session::{BotSessionRegistry, ConnectionSupervisor};
use nimbus_storage::SqliteSessionStore;

use crate::shutdown;

/// Interval between session TTL sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Initializes the tracing subscriber with the given filter default.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nimbus=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Runs the `nimbus serve` command.
pub async fn run_serve(
    config: NimbusConfig,
    factory: Arc<dyn SocketFactory>,
    pairing: Arc<dyn PairingTransport>,
) -> Result<(), NimbusError> {
    init_tracing();
    info!("starting nimbus serve");

    let store = Arc::new(SqliteSessionStore::open(&config.storage.path).await?);
    let registry = Arc::new(BotSessionRegistry::new());
    let payments = Arc::new(PaymentClient::new(&config.payments)?);
    let commands = CommandRegistry::new();
    let router = Arc::new(MessageRouter::new(commands, payments.clone()));

    info!(
        plugins = router.plugin_count(),
        payments_available = payments.is_available(),
        "runtime assembled"
    );

    // Drop sessions idle past the TTL before resuming anything.
    match store.purge_expired(config.storage.session_ttl_days).await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "expired sessions purged"),
        Err(e) => warn!(error = %e, "startup TTL sweep failed"),
    }

    let resumed = resume_sessions(&config, &store, &registry, &factory, &router).await;
    info!(resumed, "stored sessions resumed");

    let cancel = shutdown::install_signal_handler();

    // Periodic TTL sweep.
    {
        let store = store.clone();
        let ttl_days = config.storage.session_ttl_days;
        let sweep_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match store.purge_expired(ttl_days).await {
                            Ok(0) => {}
                            Ok(purged) => info!(purged, "expired sessions purged"),
                            Err(e) => warn!(error = %e, "TTL sweep failed"),
                        }
                    }
                    _ = sweep_cancel.cancelled() => break,
                }
            }
        });
    }

    // HTTP gateway.
    let gateway_state = GatewayState {
        registry: registry.clone(),
        pairing,
        payments,
        store: Some(store.clone()),
        plugin_names: router.plugin_names(),
        bot: config.bot.clone(),
        started_at: Instant::now(),
    };
    let gateway_config = config.gateway.clone();
    let gateway_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = nimbus_gateway::start_server(&gateway_config, gateway_state) => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "gateway exited");
                }
            }
            _ = gateway_cancel.cancelled() => {}
        }
    });

    cancel.cancelled().await;
    shutdown_sessions(&registry).await;
    store.close().await?;

    info!("nimbus serve shutdown complete");
    Ok(())
}

/// Resume every session with stored credentials. Individual failures are
/// logged and skipped; a dead transport must not take down the process.
async fn resume_sessions(
    config: &NimbusConfig,
    store: &Arc<SqliteSessionStore>,
    registry: &Arc<BotSessionRegistry>,
    factory: &Arc<dyn SocketFactory>,
    router: &Arc<MessageRouter>,
) -> usize {
    let ids = match store.list_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, "failed to list stored sessions");
            return 0;
        }
    };

    let mut resumed = 0;
    for id in ids {
        let session = ConnectionSupervisor::new(
            id.clone(),
            Credentials::empty(),
            config.connection.clone(),
            config.bot.clone(),
            factory.clone(),
            store.clone() as Arc<dyn nimbus_core::SessionStore>,
            registry.clone(),
            router.clone(),
        );
        match session.start().await {
            Ok(()) => {
                resumed += 1;
                info!(session = %id.0, "session resumed");
            }
            Err(e) => {
                warn!(session = %id.0, error = %e, "session resume failed");
            }
        }
    }
    resumed
}

/// Stop every running session, ignoring individual stop failures.
async fn shutdown_sessions(registry: &Arc<BotSessionRegistry>) {
    let sessions = registry.all();
    if sessions.is_empty() {
        return;
    }
    info!(count = sessions.len(), "stopping sessions");
    for session in sessions {
        session.stop().await;
    }
}
