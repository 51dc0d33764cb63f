// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable command handlers for Nimbus.
//!
//! External commands implement [`nimbus_core::CommandHandler`] and are
//! collected into a [`CommandRegistry`], which the message router consults
//! before falling back to the built-in command set.

mod registry;

pub use registry::{CommandRegistry, ExecuteOutcome};
