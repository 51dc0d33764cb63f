// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for health and the payment webhook.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nimbus_payments::PaymentWebhook;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// ISO 8601 timestamp of the probe.
    pub timestamp: String,
    pub uptime_secs: u64,
    pub sessions: SessionsHealth,
    pub plugins: PluginsHealth,
    pub bot: BotHealth,
    pub storage: StorageHealth,
    pub payment: PaymentHealth,
}

#[derive(Debug, Serialize)]
pub struct SessionsHealth {
    pub active: usize,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PluginsHealth {
    pub loaded: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BotHealth {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct StorageHealth {
    pub connected: bool,
    pub sessions_stored: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PaymentHealth {
    /// "available", "disabled", or "error: ...".
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Response body for the payment webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

/// Error response body shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /health
///
/// Aggregates session, plugin, storage, and payment health into one
/// JSON document. Always returns 200; degraded subsystems are reported
/// in their own sections.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let storage = match &state.store {
        Some(store) => match store.list_ids().await {
            Ok(ids) => StorageHealth {
                connected: true,
                sessions_stored: Some(ids.len()),
            },
            Err(_) => StorageHealth {
                connected: false,
                sessions_stored: None,
            },
        },
        None => StorageHealth {
            connected: false,
            sessions_stored: None,
        },
    };

    let payment = if !state.payments.is_available() {
        PaymentHealth {
            status: "disabled".to_string(),
            balance: None,
            currency: None,
        }
    } else {
        match state.payments.wallet_balance().await {
            Ok(balance) => PaymentHealth {
                status: "available".to_string(),
                balance: Some(balance.balance),
                currency: Some(balance.currency),
            },
            Err(e) => PaymentHealth {
                status: format!("error: {e}"),
                balance: None,
                currency: None,
            },
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        service: "nimbus".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        sessions: SessionsHealth {
            active: state.registry.len(),
            ids: state.registry.ids().into_iter().map(|id| id.0).collect(),
        },
        plugins: PluginsHealth {
            loaded: state.plugin_names.len(),
            names: state.plugin_names.clone(),
        },
        bot: BotHealth {
            name: state.bot.name.clone(),
            prefix: state.bot.prefix.clone(),
        },
        storage,
        payment,
    })
}

/// POST /api/payment/webhook
///
/// Receives payment confirmations from the provider. The payload is
/// logged and acknowledged; reconciliation is the provider dashboard's
/// job, not ours.
pub async fn post_payment_webhook(Json(payload): Json<PaymentWebhook>) -> Response {
    tracing::info!(
        reference = payload.external_reference.as_deref().unwrap_or("-"),
        status = payload.status.as_deref().unwrap_or("-"),
        amount = payload.amount,
        receipt = payload.mpesa_receipt_number.as_deref().unwrap_or("-"),
        "payment webhook received"
    );

    (
        StatusCode::OK,
        Json(WebhookAck {
            success: true,
            message: "Webhook received".to_string(),
        }),
    )
        .into_response()
}
