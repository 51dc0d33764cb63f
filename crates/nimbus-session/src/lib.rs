// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle: connection supervision, the live-session registry,
//! and per-user conversation state.

pub mod pending;
pub mod registry;
pub mod supervisor;
pub mod user_state;

pub use pending::{PendingActionCache, StagedAction};
pub use registry::BotSessionRegistry;
pub use supervisor::{ConnectionSupervisor, MessageDispatcher};
pub use user_state::{Pending, UserStateStore};
