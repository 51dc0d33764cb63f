// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Nimbus bot runner.

use thiserror::Error;

/// The primary error type used across all Nimbus crates.
#[derive(Debug, Error)]
pub enum NimbusError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Session store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level socket errors (connect failure, send failure, close failure).
    #[error("socket error: {message}")]
    Socket {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A session with this id is already connecting or connected.
    #[error("session already active: {session_id}")]
    AlreadyActive { session_id: String },

    /// No running session with this id.
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Requested command handler was not found in the registry.
    #[error("handler not found: {name}")]
    HandlerNotFound { name: String },

    /// Third-party HTTP API errors (payment push, logo/music/hosting services).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// User input rejected before any network call (bad phone, bad amount, oversized file).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NimbusError {
    /// Shorthand for an API error with no underlying source.
    pub fn api(message: impl Into<String>) -> Self {
        NimbusError::Api {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a socket error with no underlying source.
    pub fn socket(message: impl Into<String>) -> Self {
        NimbusError::Socket {
            message: message.into(),
            source: None,
        }
    }
}
