// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Nimbus bot runner.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Nimbus configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NimbusConfig {
    /// Bot identity and chat behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Connection supervision settings.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Session store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Payment provider settings.
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Gateway HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Bot identity and chat behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Command prefix; all commands are `<prefix><command> <args>`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Owner phone numbers shown by the owner/contact commands.
    #[serde(default)]
    pub owner_numbers: Vec<String>,

    /// React to every inbound chat message with a random emoji.
    #[serde(default = "default_true")]
    pub auto_react: bool,

    /// React to status broadcasts with a random emoji.
    #[serde(default = "default_true")]
    pub auto_status_react: bool,

    /// Send a welcome message to self after a successful connect.
    #[serde(default = "default_true")]
    pub welcome_message: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            prefix: default_prefix(),
            owner_numbers: Vec::new(),
            auto_react: true,
            auto_status_react: true,
            welcome_message: true,
        }
    }
}

fn default_bot_name() -> String {
    "Nimbus".to_string()
}

fn default_prefix() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

/// Connection supervision configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Reconnect attempt ceiling for non-terminal disconnects.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Base reconnect delay; actual delay is `base * attempts`, capped.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Ceiling on the computed reconnect delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_reconnect_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    5000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Sessions idle longer than this many days are purged.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            session_ttl_days: default_session_ttl_days(),
        }
    }
}

fn default_db_path() -> String {
    "nimbus.db".to_string()
}

fn default_session_ttl_days() -> u32 {
    7
}

/// Payment provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// Bearer token for the payment API. Payments are disabled when unset.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Merchant channel the funds settle into.
    #[serde(default = "default_channel_id")]
    pub channel_id: String,

    /// Mobile money provider identifier.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Payment API base URL.
    #[serde(default = "default_payments_base_url")]
    pub base_url: String,

    /// Customer name attached to push requests.
    #[serde(default = "default_customer_name")]
    pub customer_name: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            channel_id: default_channel_id(),
            provider: default_provider(),
            base_url: default_payments_base_url(),
            customer_name: default_customer_name(),
        }
    }
}

fn default_channel_id() -> String {
    "3342".to_string()
}

fn default_provider() -> String {
    "m-pesa".to_string()
}

fn default_payments_base_url() -> String {
    "https://api.payhero.dev".to_string()
}

fn default_customer_name() -> String {
    "Nimbus Customer".to_string()
}

/// Gateway HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    50900
}
