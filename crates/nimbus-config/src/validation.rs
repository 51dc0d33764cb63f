// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of the configuration.

use nimbus_core::NimbusError;

use crate::model::NimbusConfig;

/// Validate constraints Figment's type-level parsing cannot express.
///
/// Collects every problem before failing so the operator fixes them in
/// one pass.
pub fn validate_config(config: &NimbusConfig) -> Result<(), NimbusError> {
    let mut problems = Vec::new();

    if config.bot.prefix.is_empty() {
        problems.push("bot.prefix must not be empty".to_string());
    }

    if config.connection.base_delay_ms == 0 {
        problems.push("connection.base_delay_ms must be greater than 0".to_string());
    }

    if config.connection.max_delay_ms < config.connection.base_delay_ms {
        problems.push(
            "connection.max_delay_ms must be at least connection.base_delay_ms".to_string(),
        );
    }

    if config.storage.session_ttl_days == 0 {
        problems.push("storage.session_ttl_days must be at least 1".to_string());
    }

    if config.gateway.port == 0 {
        problems.push("gateway.port must not be 0".to_string());
    }

    for number in &config.bot.owner_numbers {
        if !number.chars().all(|c| c.is_ascii_digit()) {
            problems.push(format!(
                "bot.owner_numbers entry {number:?} must be digits only"
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(NimbusError::Config(problems.join("; ")))
    }
}
