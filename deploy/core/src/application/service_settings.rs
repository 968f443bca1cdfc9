// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service Settings Builder
//!
//! Completes a service's declared settings with what the deployment decides:
//! namespace, cluster address, image reference and JVM heap options.

use std::sync::Arc;
use tracing::debug;

use crate::application::address::build_address;
use crate::domain::artifact::{ArtifactSource, ImageReference};
use crate::domain::error::DeployError;
use crate::domain::service::{ServiceDescriptor, ServiceSettings};

pub const JAVA_OPTS_ENV: &str = "JAVA_OPTS";

/// Sizes the JVM heap at half of the container's memory limit.
pub const CONTAINER_AWARE_JAVA_OPTS: &str =
    "-XX:+UnlockExperimentalVMOptions -XX:+UseCGroupMemoryLimitForHeap -XX:MaxRAMFraction=2";

pub struct ServiceSettingsBuilder {
    artifacts: Arc<dyn ArtifactSource>,
}

impl ServiceSettingsBuilder {
    pub fn new(artifacts: Arc<dyn ArtifactSource>) -> Self {
        Self { artifacts }
    }

    /// Image reference of `service` for `deployment_name`.
    pub fn artifact_id(
        &self,
        deployment_name: &str,
        service: &ServiceDescriptor,
    ) -> Result<String, DeployError> {
        let artifact = &service.artifact_name;
        let version = self
            .artifacts
            .artifact_version(deployment_name, artifact)
            .ok_or_else(|| DeployError::MissingArtifactVersion {
                artifact: artifact.clone(),
                deployment: deployment_name.to_string(),
            })?;
        let registry = self.artifacts.docker_registry(deployment_name, artifact);
        Ok(ImageReference::new(registry, artifact.as_str(), &version).to_string())
    }

    /// Settings for one deployment run, starting from the service's declared
    /// `defaults`. A location declared on the service wins over
    /// `default_location`; an explicit `JAVA_OPTS` is never replaced.
    pub fn build(
        &self,
        service: &ServiceDescriptor,
        defaults: &ServiceSettings,
        deployment_name: &str,
        default_location: &str,
    ) -> Result<ServiceSettings, DeployError> {
        let mut settings = defaults.clone();

        let location = settings
            .location
            .get_or_insert_with(|| default_location.to_string())
            .clone();
        settings.address = Some(build_address(&service.canonical_name, &location));

        if settings.artifact_id.is_none() {
            settings.artifact_id = Some(self.artifact_id(deployment_name, service)?);
        }

        if service.runs_on_jvm {
            settings
                .env
                .entry(JAVA_OPTS_ENV.to_string())
                .or_insert_with(|| CONTAINER_AWARE_JAVA_OPTS.to_string());
        }

        debug!(
            service = %service.canonical_name,
            location = %location,
            artifact = settings.artifact_id.as_deref().unwrap_or_default(),
            "Built service settings"
        );
        Ok(settings)
    }
}
