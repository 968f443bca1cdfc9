// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the fleetyard CLI

pub mod config;
pub mod connect;
pub mod render;

pub use self::config::ConfigCommand;
pub use self::connect::ConnectArgs;
pub use self::render::RenderArgs;

use anyhow::{Context, Result};
use fleetyard_core::infrastructure::{DeploymentFile, ResolvedDeployment};
use std::path::PathBuf;

/// Load, validate and resolve the deployment file.
pub(crate) fn load_deployment(
    config: Option<PathBuf>,
) -> Result<(DeploymentFile, ResolvedDeployment)> {
    let file = DeploymentFile::load(config).context("Failed to load deployment file")?;
    let resolved = file.resolve().context("Failed to resolve deployment file")?;
    Ok((file, resolved))
}
