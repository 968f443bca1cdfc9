// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Concrete collaborators of the manifest assembly engine.

pub mod artifact_catalog;
pub mod deployment_file;
pub mod handlebars_renderer;
pub mod kubectl;
pub mod secret_store;

pub use artifact_catalog::ArtifactCatalog;
pub use deployment_file::{ConfigError, DeploymentFile, ResolvedDeployment};
pub use handlebars_renderer::HandlebarsTemplateRenderer;
pub use kubectl::KubectlCommandBuilder;
pub use secret_store::{ManifestSecretStore, StagedSecret};
