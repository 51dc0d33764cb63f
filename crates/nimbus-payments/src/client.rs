// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the payment gateway.
//!
//! Wraps the gateway's three operations (STK push initiation, transaction
//! status lookup, wallet balance) behind [`PaymentClient`]. The client is
//! optional at runtime: without an auth token it reports itself
//! unavailable and every call fails fast with a configuration hint.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use nimbus_config::PaymentsConfig;
use nimbus_core::NimbusError;

use crate::phone::normalize_phone;
use crate::types::{
    StkPushOutcome, StkPushRequest, StkPushResponse, TransactionStatus, WalletBalance,
};

const STK_TIMEOUT: Duration = Duration::from_secs(30);
const STATUS_TIMEOUT: Duration = Duration::from_secs(15);
const BALANCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the M-Pesa payment gateway.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: Option<reqwest::Client>,
    base_url: String,
    channel_id: String,
    provider: String,
    customer_name: String,
}

impl PaymentClient {
    /// Build a client from configuration. A missing auth token yields a
    /// disabled client rather than an error so the rest of the bot keeps
    /// running without payments.
    pub fn new(config: &PaymentsConfig) -> Result<Self, NimbusError> {
        let client = match &config.auth_token {
            Some(token) if !token.trim().is_empty() => {
                let mut headers = HeaderMap::new();
                let bearer = format!("Bearer {}", token.trim());
                let mut auth = HeaderValue::from_str(&bearer).map_err(|e| {
                    NimbusError::Config(format!("invalid payment auth token: {e}"))
                })?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );

                let client = reqwest::Client::builder()
                    .default_headers(headers)
                    .build()
                    .map_err(|e| NimbusError::Api {
                        message: format!("failed to build payment HTTP client: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                info!(channel_id = %config.channel_id, provider = %config.provider,
                    "payment client initialized");
                Some(client)
            }
            _ => {
                warn!("payment client disabled, no auth token configured");
                None
            }
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel_id: config.channel_id.clone(),
            provider: config.provider.clone(),
            customer_name: config.customer_name.clone(),
        })
    }

    /// True when an auth token was configured and the client can make calls.
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    fn require_client(&self) -> Result<&reqwest::Client, NimbusError> {
        self.client.as_ref().ok_or_else(|| {
            NimbusError::Api {
                message: "Payment service not available. Check payment credentials.".into(),
                source: None,
            }
        })
    }

    /// Initiate an STK push to `phone` for `amount`.
    ///
    /// The phone number is normalized before sending; `reference` defaults
    /// to a timestamp-derived `BOT-` reference when the caller does not
    /// supply one.
    pub async fn stk_push(
        &self,
        phone: &str,
        amount: f64,
        reference: Option<String>,
    ) -> Result<StkPushOutcome, NimbusError> {
        let client = self.require_client()?;
        let phone = normalize_phone(phone)?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(NimbusError::Validation(format!(
                "Invalid amount: {amount}. Must be a positive number."
            )));
        }

        let reference = reference.unwrap_or_else(|| {
            let millis = Utc::now().timestamp_millis().to_string();
            let tail = &millis[millis.len().saturating_sub(8)..];
            format!("BOT-{tail}")
        });

        let body = StkPushRequest {
            phone_number: phone.clone(),
            amount,
            provider: self.provider.clone(),
            channel_id: self.channel_id.clone(),
            external_reference: reference.clone(),
            customer_name: self.customer_name.clone(),
        };

        debug!(phone = %phone, amount, reference = %reference, "initiating STK push");

        let response = client
            .post(format!("{}/payments", self.base_url))
            .timeout(STK_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error("STK push", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status_error("STK push", status, response).await);
        }

        let parsed: StkPushResponse = response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse STK push response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let outcome = StkPushOutcome {
            reference: parsed.reference.unwrap_or(reference),
            status: parsed.status.unwrap_or_else(|| "pending".to_string()),
            phone,
            amount,
            timestamp: Utc::now(),
        };
        info!(reference = %outcome.reference, status = %outcome.status, "STK push initiated");
        Ok(outcome)
    }

    /// Look up the status of a previously initiated transaction.
    pub async fn transaction_status(
        &self,
        reference: &str,
    ) -> Result<TransactionStatus, NimbusError> {
        let client = self.require_client()?;
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(NimbusError::Validation(
                "Transaction reference is required".into(),
            ));
        }

        debug!(reference = %reference, "checking transaction status");

        let response = client
            .get(format!("{}/transaction-status", self.base_url))
            .query(&[("reference", reference)])
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify_transport_error("transaction check", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status_error("transaction check", status, response).await);
        }

        response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse transaction status: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Fetch the service wallet balance.
    pub async fn wallet_balance(&self) -> Result<WalletBalance, NimbusError> {
        let client = self.require_client()?;

        debug!("checking wallet balance");

        let response = client
            .get(format!("{}/wallets", self.base_url))
            .query(&[("wallet_type", "service_wallet")])
            .timeout(BALANCE_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify_transport_error("balance check", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status_error("balance check", status, response).await);
        }

        response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse wallet balance: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

/// Map transport failures onto the user-facing error classes.
fn classify_transport_error(operation: &str, error: reqwest::Error) -> NimbusError {
    if error.is_timeout() {
        return NimbusError::Timeout {
            duration: STK_TIMEOUT,
        };
    }
    if error.is_connect() {
        return NimbusError::Api {
            message: format!("{operation} failed: network error, check connectivity"),
            source: Some(Box::new(error)),
        };
    }
    NimbusError::Api {
        message: format!("{operation} failed: {error}"),
        source: Some(Box::new(error)),
    }
}

async fn classify_status_error(
    operation: &str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> NimbusError {
    let body = response.text().await.unwrap_or_default();
    let message = if status == reqwest::StatusCode::UNAUTHORIZED {
        format!("{operation} failed: invalid payment credentials")
    } else {
        format!("{operation} failed: gateway returned {status}: {body}")
    };
    NimbusError::Api {
        message,
        source: None,
    }
}
