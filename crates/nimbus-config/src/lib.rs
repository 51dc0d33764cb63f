// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Nimbus bot runner.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.

#![allow(clippy::result_large_err)] // figment::Error is external

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    BotConfig, ConnectionConfig, GatewayConfig, NimbusConfig, PaymentsConfig, StorageConfig,
};

use nimbus_core::NimbusError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that loads config from TOML files
/// plus env vars via Figment, then runs post-deserialization validation.
pub fn load_and_validate() -> Result<NimbusConfig, NimbusError> {
    let config = loader::load_config().map_err(|e| NimbusError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<NimbusConfig, NimbusError> {
    let config =
        loader::load_config_from_str(toml_content).map_err(|e| NimbusError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
