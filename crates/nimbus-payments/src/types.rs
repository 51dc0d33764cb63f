// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the payment gateway API.

use serde::{Deserialize, Serialize};

/// Body of an STK push initiation request.
#[derive(Debug, Clone, Serialize)]
pub struct StkPushRequest {
    pub phone_number: String,
    pub amount: f64,
    pub provider: String,
    pub channel_id: String,
    pub external_reference: String,
    pub customer_name: String,
}

/// Raw gateway response to an STK push initiation.
#[derive(Debug, Clone, Deserialize)]
pub struct StkPushResponse {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of a successfully initiated STK push.
#[derive(Debug, Clone)]
pub struct StkPushOutcome {
    /// Reference to poll for status; the gateway's if it returned one,
    /// otherwise the one we sent.
    pub reference: String,
    pub status: String,
    pub phone: String,
    pub amount: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Transaction status as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatus {
    pub reference: String,
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub response_description: Option<String>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

/// Service wallet balance snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalance {
    #[serde(default = "zero_balance")]
    pub balance: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn zero_balance() -> String {
    "0.00".to_string()
}

fn default_currency() -> String {
    "KES".to_string()
}

/// Payment webhook notification delivered by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentWebhook {
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub mpesa_receipt_number: Option<String>,
}
