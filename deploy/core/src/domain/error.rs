// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::secret_store::SecretStoreError;
use crate::domain::template::RenderError;

/// Fatal configuration errors raised while assembling a service's manifests.
///
/// Assembly never produces partial output: any of these aborts the whole
/// service.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Service {sidecar} is required but was not supplied for deployment of {service} (missing profile '{profile}')")]
    SidecarProfileMissing {
        sidecar: String,
        service: String,
        profile: String,
    },

    #[error("Invalid init container format for {service}: {reason}")]
    InvalidInitContainer { service: String, reason: String },

    #[error("Invalid host alias format for {service}: {reason}")]
    InvalidHostAlias { service: String, reason: String },

    #[error("No settings were resolved for service {0}")]
    MissingServiceSettings(String),

    #[error("No version is available for artifact {artifact} in deployment {deployment}")]
    MissingArtifactVersion { artifact: String, deployment: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    SecretStore(#[from] SecretStoreError),
}
