// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use nimbus_config::{BotConfig, GatewayConfig};
use nimbus_core::NimbusError;
use nimbus_payments::PaymentClient;
use nimbus_session::BotSessionRegistry;
use nimbus_storage::SqliteSessionStore;

use crate::handlers;
use crate::pairing::{self, PairingTransport};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Running bot sessions.
    pub registry: Arc<BotSessionRegistry>,
    /// Pairing flow owned by the transport side.
    pub pairing: Arc<dyn PairingTransport>,
    /// Payment client for the health probe.
    pub payments: Arc<PaymentClient>,
    /// Credential store; None when serving without persistence.
    pub store: Option<Arc<SqliteSessionStore>>,
    /// Snapshot of externally registered command names.
    pub plugin_names: Vec<String>,
    /// Bot identity shown by /health.
    pub bot: BotConfig,
    /// Process start time for uptime calculation.
    pub started_at: Instant,
}

/// Build the gateway router over the shared state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/qr", get(pairing::get_qr))
        .route("/code", get(pairing::get_code))
        .route("/api/payment/webhook", post(handlers::post_payment_webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the task is aborted.
pub async fn start_server(config: &GatewayConfig, state: GatewayState) -> Result<(), NimbusError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| NimbusError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| NimbusError::Internal(format!("gateway server error: {e}")))
}
