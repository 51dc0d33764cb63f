// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Nimbus bot runner.
//!
//! Holds one table of credential blobs keyed by session id, with a TTL
//! sweep that drops sessions idle longer than the configured window.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteSessionStore;
