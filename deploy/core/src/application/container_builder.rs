// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Container Builder
//!
//! Builds [`ContainerSpec`]s for a service's pod: service containers (the
//! primary container and system sidecars) with probes, lifecycle hooks and
//! sizing, and operator-declared sidecars taken verbatim.

use std::collections::BTreeMap;

use crate::domain::config_source::ConfigSource;
use crate::domain::container::{
    ContainerSpec, LifecycleSpec, ProbeSpec, ResourceRequirements, VolumeMountSpec,
};
use crate::domain::deployment::DeploymentDetails;
use crate::domain::service::{ServiceDescriptor, ServiceSettings};
use crate::domain::sidecar::SidecarConfig;
use crate::domain::sizing::CustomSizing;

/// Builds the containers of one service's pod.
pub struct ContainerBuilder<'a> {
    service: &'a ServiceDescriptor,
    details: &'a DeploymentDetails,
}

impl<'a> ContainerBuilder<'a> {
    pub fn new(service: &'a ServiceDescriptor, details: &'a DeploymentDetails) -> Self {
        Self { service, details }
    }

    /// Build a service container named `name` from `settings`.
    ///
    /// Every config source and every extra volume of `settings` is mounted;
    /// `env` is the pod-wide merged environment.
    pub fn build(
        &self,
        name: &str,
        settings: &ServiceSettings,
        config_sources: &[ConfigSource],
        env: &BTreeMap<String, String>,
    ) -> ContainerSpec {
        let volume_mounts = config_sources
            .iter()
            .chain(settings.kubernetes.volumes.iter())
            .map(|source| VolumeMountSpec::new(&source.id, &source.mount_path))
            .collect();

        let pre_stop_command = self.service.pre_stop_command();
        let lifecycle =
            (!pre_stop_command.is_empty()).then_some(LifecycleSpec { pre_stop_command });

        ContainerSpec {
            name: name.to_string(),
            image_id: settings.artifact_id.clone(),
            port: Some(settings.port),
            command: Vec::new(),
            args: Vec::new(),
            volume_mounts,
            probe: Some(readiness_probe(settings)),
            lifecycle,
            env: env.clone(),
            resources: resource_requirements(
                self.details.custom_sizing(),
                name,
                &self.service.service_type,
            ),
            security_context: None,
        }
    }

    /// Build an operator-declared sidecar exactly as declared: no port, probe,
    /// lifecycle hook or computed sizing.
    pub fn build_sidecar(config: &SidecarConfig) -> ContainerSpec {
        let mut volume_mounts = Vec::with_capacity(config.config_map_volume_mounts.len() + 1);
        if let Some(mount_path) = config.host_mount_path() {
            volume_mounts.push(VolumeMountSpec::new(&config.name, mount_path));
        }
        volume_mounts.extend(
            config
                .config_map_volume_mounts
                .iter()
                .map(|mount| VolumeMountSpec::new(&mount.config_map_name, &mount.mount_path)),
        );

        ContainerSpec {
            name: config.name.clone(),
            image_id: Some(config.docker_image.clone()),
            port: None,
            command: config.command.clone(),
            args: config.args.clone(),
            volume_mounts,
            probe: None,
            lifecycle: None,
            env: config.env.clone(),
            resources: None,
            security_context: config.security_context,
        }
    }
}

/// Exec probe against the health endpoint when one is declared, TCP probe
/// against the service port otherwise.
pub fn readiness_probe(settings: &ServiceSettings) -> ProbeSpec {
    match settings.health_endpoint() {
        Some(endpoint) => ProbeSpec::Exec {
            command: settings.readiness_exec_command(endpoint),
        },
        None => ProbeSpec::TcpSocket { port: settings.port },
    }
}

/// Requests and limits for `container_name`, falling back to the sizing of
/// `service_type`. `None` when neither declares any quantity.
pub fn resource_requirements(
    sizing: Option<&CustomSizing>,
    container_name: &str,
    service_type: &str,
) -> Option<ResourceRequirements> {
    let component = sizing?.lookup(container_name, service_type)?;
    if component.requests.is_empty() && component.limits.is_empty() {
        return None;
    }
    tracing::debug!(
        container = %container_name,
        service = %service_type,
        "Applying custom sizing"
    );
    Some(ResourceRequirements {
        requests: component.requests.clone(),
        limits: component.limits.clone(),
    })
}
