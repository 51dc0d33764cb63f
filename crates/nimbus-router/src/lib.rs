// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message routing.
//!
//! [`MessageRouter`] is the session dispatcher: it classifies each
//! inbound event (status broadcast, button click, pending continuation,
//! prefix command, plain chatter) and fans out to the built-in command
//! set, registered plugins, and the reaction observers.

mod buttons;
mod commands;
mod continuation;
mod observers;
mod router;

pub use observers::{CHAT_EMOJIS, STATUS_EMOJIS};
pub use router::MessageRouter;
