// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nimbus - multi-session WhatsApp bot runner.
//!
//! Binary entry point: parses the CLI, loads configuration, and hands
//! off to the subcommand implementations.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;
mod status;
mod transport;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use nimbus_config::NimbusConfig;

/// Nimbus - multi-session WhatsApp bot runner.
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot runner: sessions, router, and HTTP gateway.
    Serve,
    /// Query a running instance's health endpoint.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<NimbusConfig, nimbus_core::NimbusError> {
    match &cli.config {
        Some(path) => {
            let config = nimbus_config::load_config_from_path(path)
                .map_err(|e| nimbus_core::NimbusError::Config(e.to_string()))?;
            nimbus_config::validation::validate_config(&config)?;
            Ok(config)
        }
        None => nimbus_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("nimbus: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => {
            let transport = Arc::new(transport::UnconfiguredTransport);
            serve::run_serve(config, transport.clone(), transport).await
        }
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("nimbus: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("nimbus: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = nimbus_config::load_and_validate_str("").expect("default config");
        assert_eq!(config.bot.name, "Nimbus");
    }
}
