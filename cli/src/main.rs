// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Fleetyard CLI
//!
//! The `fleetyard` binary renders the Kubernetes manifests of a deployment
//! and the secret bundles they mount.
//!
//! ## Commands
//!
//! - `fleetyard render [--service NAME] [--output DIR]` - Assemble manifests
//! - `fleetyard connect --service NAME` - Print a port-forward command
//! - `fleetyard config show|validate` - Inspect the deployment file
//!
//! Logs go to stderr so rendered manifests can be piped from stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fleetyard_cli::commands::{self, ConfigCommand, ConnectArgs, RenderArgs};

/// Fleetyard - Kubernetes manifests for service deployments
#[derive(Parser)]
#[command(name = "fleetyard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the deployment file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "FLEETYARD_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FLEETYARD_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble namespace, service and deployment manifests
    #[command(name = "render")]
    Render(RenderArgs),

    /// Print the command that port-forwards to a running service
    #[command(name = "connect")]
    Connect(ConnectArgs),

    /// Deployment file management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Render(args) => commands::render::execute(args, cli.config).await,
        Commands::Connect(args) => commands::connect::execute(args, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
