// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities: mock transport, mock session store, and inbound
//! event builders.

pub mod builders;
pub mod mock_socket;
pub mod mock_store;

pub use builders::EventBuilder;
pub use mock_socket::{MockConnection, MockSocket, MockSocketFactory, SentMessage};
pub use mock_store::MockSessionStore;
