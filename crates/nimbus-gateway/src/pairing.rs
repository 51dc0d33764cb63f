// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairing endpoints: GET /qr and GET /code.
//!
//! Both allocate a fresh session id, hand it to the transport's pairing
//! flow, and return the material the user needs to finish linking on
//! their phone. Once the handshake completes the transport side launches
//! the bot session; the gateway only surfaces the QR payload or code.

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrcode::render::unicode;
use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use nimbus_core::{NimbusError, SessionId};

use crate::handlers::ErrorResponse;
use crate::server::GatewayState;

/// One-time pairing handshake against the transport.
///
/// The gateway never talks to the wire protocol itself; the binary wires
/// in an implementation backed by whatever transport is configured.
#[async_trait]
pub trait PairingTransport: Send + Sync {
    /// Begin QR pairing for a new session and return the QR payload text.
    async fn begin_qr(&self, session_id: &SessionId) -> Result<String, NimbusError>;

    /// Request a numeric pairing code for the given phone number.
    async fn pairing_code(
        &self,
        session_id: &SessionId,
        phone: &str,
    ) -> Result<String, NimbusError>;
}

/// Query parameters accepted by the pairing endpoints.
#[derive(Debug, Deserialize)]
pub struct PairingQuery {
    /// Re-pair an existing session id instead of allocating a new one.
    #[serde(default)]
    pub session: Option<String>,
    /// Phone number, required by /code.
    #[serde(default)]
    pub number: Option<String>,
}

/// Response body for GET /qr.
#[derive(Debug, Serialize)]
pub struct QrResponse {
    pub session_id: String,
    /// Raw QR payload as handed out by the transport.
    pub qr: String,
    /// Terminal-friendly unicode rendering of the same payload.
    pub rendered: String,
}

/// Response body for GET /code.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub session_id: String,
    pub code: String,
    pub message: String,
}

fn session_from_query(state: &GatewayState, query: &PairingQuery) -> Result<SessionId, Response> {
    let id = SessionId(
        query
            .session
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );
    if state.registry.contains(&id) {
        let err = NimbusError::AlreadyActive {
            session_id: id.0.clone(),
        };
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response());
    }
    Ok(id)
}

/// GET /qr
///
/// Allocates a session id, begins QR pairing, and returns the payload
/// both raw and rendered as a scannable unicode block.
pub async fn get_qr(
    State(state): State<GatewayState>,
    Query(query): Query<PairingQuery>,
) -> Response {
    let id = match session_from_query(&state, &query) {
        Ok(id) => id,
        Err(conflict) => return conflict,
    };

    match state.pairing.begin_qr(&id).await {
        Ok(payload) => {
            let rendered = match QrCode::new(payload.as_bytes()) {
                Ok(code) => code
                    .render::<unicode::Dense1x2>()
                    .quiet_zone(false)
                    .build(),
                Err(e) => {
                    warn!(session = %id.0, error = %e, "qr rendering failed");
                    String::new()
                }
            };
            info!(session = %id.0, "qr pairing started");
            (
                StatusCode::OK,
                Json(QrResponse {
                    session_id: id.0,
                    qr: payload,
                    rendered,
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(session = %id.0, error = %e, "qr pairing failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /code?number=254712345678
///
/// Begins code pairing for the given phone number and returns the code
/// the user types under Linked Devices.
pub async fn get_code(
    State(state): State<GatewayState>,
    Query(query): Query<PairingQuery>,
) -> Response {
    let number = match query.number.as_deref() {
        Some(n) if !n.trim().is_empty() => n.trim(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "missing required query parameter: number".to_string(),
                }),
            )
                .into_response();
        }
    };

    let phone = match nimbus_payments::normalize_phone(number) {
        Ok(phone) => phone,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let id = match session_from_query(&state, &query) {
        Ok(id) => id,
        Err(conflict) => return conflict,
    };

    match state.pairing.pairing_code(&id, &phone).await {
        Ok(code) => {
            info!(session = %id.0, "code pairing started");
            (
                StatusCode::OK,
                Json(CodeResponse {
                    session_id: id.0,
                    code,
                    message: "Enter this code in WhatsApp Linked Devices".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(session = %id.0, error = %e, "code pairing failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
