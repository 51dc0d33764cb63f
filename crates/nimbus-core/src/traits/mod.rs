// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams to the external collaborators of the bot runner.
//!
//! The WhatsApp transport, the persistent session store, and command
//! handlers are all reached through these traits; production adapters and
//! test mocks are interchangeable behind them.

pub mod handler;
pub mod socket;
pub mod store;

pub use handler::{CommandContext, CommandHandler};
pub use socket::{
    ConnectionUpdate, DisconnectReason, ProtocolClient, SocketEvent, SocketFactory,
};
pub use store::SessionStore;
