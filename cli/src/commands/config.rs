// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment file commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fleetyard_core::infrastructure::deployment_file::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, STAGING_ROOT_ENV,
};
use fleetyard_core::infrastructure::DeploymentFile;

use super::load_deployment;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Summarise the deployment file
    Show {
        /// Show deployment file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate the deployment file and resolve every service
    Validate {
        /// Path to deployment file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a sample deployment file
    Generate {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Deployment file discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./{}", DEFAULT_CONFIG_FILE);
        println!("  4. ~/.fleetyard/config.yaml");
        println!();
    }

    let (file, deployment) = load_deployment(config_override)?;

    println!("{}", "Deployment:".bold());
    println!("  Name: {}", file.name);
    println!(
        "  Version: {}",
        if file.version.is_empty() { "(unset)" } else { file.version.as_str() }
    );
    println!("  Account: {}", file.account.name);
    if let Some(context) = &file.account.context {
        println!("  Context: {}", context);
    }
    println!("  Staging: {}", deployment.details.staging_path().display());
    println!();

    println!("{}", "Services:".bold());
    for service in &deployment.services {
        let settings = deployment.resolved.service_settings(service)?;
        let state = if settings.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!(
            "  {} ({}) [{}]",
            service.canonical_name.bold(),
            service.service_type,
            state
        );
        println!("    Namespace: {}", settings.namespace());
        println!("    Port: {}", settings.port);
        if let Some(image) = &settings.artifact_id {
            println!("    Image: {}", image);
        }
        let profiles = deployment
            .resolved
            .profiles
            .get(&service.service_type)
            .map(|p| p.len())
            .unwrap_or(0);
        println!("    Profiles: {}", profiles);
        for sidecar in file.environment.sidecars_for(&service.service_type) {
            println!("      + {}", sidecar.name);
        }
    }

    if let Some(monitoring) = &deployment.monitoring {
        println!();
        println!("{}", "Monitoring:".bold());
        println!("  Sidecar: {}", monitoring.service.canonical_name);
        for profile in &monitoring.profile_names {
            println!("    - {}", profile);
        }
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating deployment file...");

    let (_, deployment) = load_deployment(config_path)?;
    for service in &deployment.services {
        deployment
            .resolved
            .service_settings(service)
            .with_context(|| format!("Service {} has no settings", service.canonical_name))?;
    }

    println!("{}", "✓ Deployment file is valid".green());
    println!(
        "  {} service(s); staging root overridable with {}",
        deployment.services.len(),
        STAGING_ROOT_ENV
    );

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    let sample = include_str!("../../templates/fleetyard-sample.yaml");

    // The sample must stay loadable.
    DeploymentFile::from_yaml_str(sample).context("Bundled sample is invalid")?;

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write deployment file to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Deployment file generated: {}", output.display()).green()
    );

    Ok(())
}
