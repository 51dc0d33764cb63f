// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Nimbus bot runner.
//!
//! Serves the operational surface around the chat sessions: an aggregate
//! health document, the pairing endpoints that mint new sessions, and
//! the payment provider's confirmation webhook. The gateway is glue; all
//! chat semantics live in nimbus-session and nimbus-router.

pub mod handlers;
pub mod pairing;
pub mod server;

pub use pairing::PairingTransport;
pub use server::{router, start_server, GatewayState};
