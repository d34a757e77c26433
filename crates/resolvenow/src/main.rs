// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ResolveNow - complaint lifecycle and real-time collaboration server.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod seed;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resolvenow_config::ResolveNowConfig;
use resolvenow_core::ResolveError;

/// ResolveNow - complaint lifecycle and real-time collaboration server.
#[derive(Parser, Debug)]
#[command(name = "resolvenow", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP/WebSocket server.
    Serve,
    /// Insert the demo admin, agent and user, and print their bearer tokens.
    Seed,
    /// Validate and print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => resolvenow_config::load_and_validate_path(path),
        None => resolvenow_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            resolvenow_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed) => seed::run_seed(config).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("resolvenow: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Renders the config as TOML with the signing key masked.
fn render_config(config: &ResolveNowConfig) -> Result<String, ResolveError> {
    let mut shown = config.clone();
    if shown.auth.signing_key.is_some() {
        shown.auth.signing_key = Some("[REDACTED]".to_string());
    }
    toml::to_string_pretty(&shown).map_err(|e| ResolveError::Config(e.to_string()))
}

fn print_config(config: &ResolveNowConfig) -> Result<(), ResolveError> {
    println!("{}", render_config(config)?);
    Ok(())
}
