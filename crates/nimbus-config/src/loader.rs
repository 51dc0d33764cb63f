// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./nimbus.toml` > `~/.config/nimbus/nimbus.toml`
//! > `/etc/nimbus/nimbus.toml` with environment variable overrides via the
//! `NIMBUS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NimbusConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nimbus/nimbus.toml` (system-wide)
/// 3. `~/.config/nimbus/nimbus.toml` (user XDG config)
/// 4. `./nimbus.toml` (local directory)
/// 5. `NIMBUS_*` environment variables
pub fn load_config() -> Result<NimbusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::file("/etc/nimbus/nimbus.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("nimbus/nimbus.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("nimbus.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and for callers that already hold the TOML text.
pub fn load_config_from_str(toml_content: &str) -> Result<NimbusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NimbusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NimbusConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `NIMBUS_BOT_AUTO_REACT` must map to
/// `bot.auto_react`, not `bot.auto.react`.
fn env_provider() -> Env {
    Env::prefixed("NIMBUS_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("bot_", "bot.", 1)
            .replacen("connection_", "connection.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("payments_", "payments.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").expect("defaults should parse");
        assert_eq!(config.bot.prefix, ".");
        assert_eq!(config.connection.max_reconnect_attempts, 3);
        assert_eq!(config.connection.base_delay_ms, 5000);
        assert_eq!(config.storage.session_ttl_days, 7);
        assert_eq!(config.gateway.port, 50900);
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
            [bot]
            prefix = "!"
            auto_react = false

            [connection]
            max_reconnect_attempts = 5
        "#;
        let config = load_config_from_str(toml).expect("should parse");
        assert_eq!(config.bot.prefix, "!");
        assert!(!config.bot.auto_react);
        assert_eq!(config.connection.max_reconnect_attempts, 5);
        // Untouched sections keep defaults.
        assert_eq!(config.storage.path, "nimbus.db");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [bot]
            prefixx = "!"
        "#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    #[serial]
    fn env_override_maps_underscored_keys() {
        // SAFETY: test-local env mutation, serialized via #[serial].
        unsafe { std::env::set_var("NIMBUS_CONNECTION_BASE_DELAY_MS", "250") };
        let config = Figment::new()
            .merge(Serialized::defaults(NimbusConfig::default()))
            .merge(env_provider())
            .extract::<NimbusConfig>()
            .expect("env override should parse");
        unsafe { std::env::remove_var("NIMBUS_CONNECTION_BASE_DELAY_MS") };
        assert_eq!(config.connection.base_delay_ms, 250);
    }
}
