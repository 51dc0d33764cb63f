// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment gateway integration for Nimbus.
//!
//! Exposes [`PaymentClient`] for STK push initiation, transaction status
//! lookup, and wallet balance queries, plus the phone normalization used
//! by chat-driven payment flows.

pub mod client;
pub mod phone;
pub mod types;

pub use client::PaymentClient;
pub use phone::normalize_phone;
pub use types::{PaymentWebhook, StkPushOutcome, TransactionStatus, WalletBalance};
