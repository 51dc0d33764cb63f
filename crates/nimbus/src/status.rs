// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nimbus status` command implementation.
//!
//! Connects to the gateway health endpoint of a running instance and
//! prints a summary. Falls back gracefully when nothing is listening.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use nimbus_config::NimbusConfig;
use nimbus_core::NimbusError;

/// The slice of the health document the status command reads.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
    sessions: SessionsHealth,
    plugins: PluginsHealth,
    payment: PaymentHealth,
}

#[derive(Debug, Deserialize)]
struct SessionsHealth {
    active: usize,
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PluginsHealth {
    loaded: usize,
}

#[derive(Debug, Deserialize)]
struct PaymentHealth {
    status: String,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
struct StatusResponse {
    running: bool,
    status: String,
    uptime_human: Option<String>,
    sessions: usize,
    gateway_host: String,
    gateway_port: u16,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Run the `nimbus status` command.
pub async fn run_status(config: &NimbusConfig, json: bool) -> Result<(), NimbusError> {
    let host = &config.gateway.host;
    let port = config.gateway.port;
    let url = format!("http://{host}:{port}/health");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| NimbusError::Internal(format!("failed to create HTTP client: {e}")))?;

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let health: HealthResponse = resp.json().await.map_err(|e| {
                NimbusError::Internal(format!("failed to parse health response: {e}"))
            })?;

            if json {
                let out = StatusResponse {
                    running: true,
                    status: health.status.clone(),
                    uptime_human: Some(format_uptime(health.uptime_secs)),
                    sessions: health.sessions.active,
                    gateway_host: host.clone(),
                    gateway_port: port,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out)
                        .map_err(|e| NimbusError::Internal(e.to_string()))?
                );
            } else {
                println!("nimbus {} ({})", health.version, health.status);
                println!("  uptime:   {}", format_uptime(health.uptime_secs));
                println!("  sessions: {}", health.sessions.active);
                for id in &health.sessions.ids {
                    println!("            {id}");
                }
                println!("  plugins:  {}", health.plugins.loaded);
                println!("  payments: {}", health.payment.status);
            }
            Ok(())
        }
        Ok(resp) => Err(NimbusError::Internal(format!(
            "gateway at {url} answered {}",
            resp.status()
        ))),
        Err(_) => {
            if json {
                let out = StatusResponse {
                    running: false,
                    status: "not running".to_string(),
                    uptime_human: None,
                    sessions: 0,
                    gateway_host: host.clone(),
                    gateway_port: port,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out)
                        .map_err(|e| NimbusError::Internal(e.to_string()))?
                );
            } else {
                println!("nimbus is not running (no gateway at {url})");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_by_magnitude() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3660), "1h 1m");
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
    }

    #[test]
    fn health_document_deserializes() {
        let json = r#"{
            "status": "ok",
            "service": "nimbus",
            "version": "0.1.0",
            "timestamp": "2026-01-01T00:00:00Z",
            "uptime_secs": 42,
            "sessions": {"active": 1, "ids": ["alpha"]},
            "plugins": {"loaded": 0, "names": []},
            "bot": {"name": "Nimbus", "prefix": "."},
            "storage": {"connected": true, "sessions_stored": 1},
            "payment": {"status": "disabled"}
        }"#;
        let health: HealthResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(health.sessions.active, 1);
        assert_eq!(health.plugins.loaded, 0);
        assert_eq!(health.payment.status, "disabled");
    }
}
