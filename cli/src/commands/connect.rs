// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `fleetyard connect` - print a port-forward command for a service.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use fleetyard_core::application::ConnectCommandBuilder;
use fleetyard_core::infrastructure::KubectlCommandBuilder;

use super::load_deployment;

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Canonical name of the service to connect to
    #[arg(short, long, value_name = "NAME")]
    pub service: String,

    /// kubectl binary to invoke
    #[arg(long, env = "FLEETYARD_KUBECTL", default_value = "kubectl")]
    pub kubectl: String,
}

pub async fn execute(args: ConnectArgs, config: Option<PathBuf>) -> Result<()> {
    let (_, deployment) = load_deployment(config)?;

    let service = deployment
        .service(&args.service)
        .ok_or_else(|| {
            anyhow!(
                "Service '{}' is not declared in the deployment file",
                args.service
            )
        })?;

    let kubectl = KubectlCommandBuilder::with_binary(args.kubectl);
    let command = ConnectCommandBuilder::new(Arc::new(kubectl))
        .build(service, &deployment.details, &deployment.resolved.runtime_settings)
        .with_context(|| format!("Failed to build connect command for {}", args.service))?;

    println!("{command}");
    Ok(())
}
