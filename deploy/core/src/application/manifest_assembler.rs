// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Manifest Assembler
//!
//! Produces the namespace, service and deployment manifests of one service.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrate staging, container building and rendering
//! - **Integration:** ConfigStager → ContainerBuilder → PodSpecRenderer → TemplateRenderer
//!
//! Assembly is stateless: every call reads the externally owned
//! configuration and returns complete manifest text or an error, never a
//! partial result.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::config_stager::ConfigStager;
use crate::application::container_builder::ContainerBuilder;
use crate::application::pod_spec_renderer::PodSpecRenderer;
use crate::application::sidecar_resolver::SidecarResolver;
use crate::domain::config_source::{ConfigSource, UniqueSources};
use crate::domain::container::PodSpec;
use crate::domain::deployment::{DeploymentDetails, ResolvedConfiguration};
use crate::domain::error::DeployError;
use crate::domain::label_sanitizer::LabelSanitizer;
use crate::domain::secret_store::SecretBundleStore;
use crate::domain::service::{ServiceDescriptor, ServiceSettings};
use crate::domain::sidecar::SidecarConfig;
use crate::domain::template::{ManifestTemplate, TemplateBindings, TemplateRenderer};

/// Rendered manifests of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceManifests {
    pub service: String,
    pub namespace: String,
    pub namespace_yaml: String,
    pub service_yaml: String,
    pub deployment_yaml: String,
}

impl ServiceManifests {
    /// All three manifests as one multi-document YAML stream.
    pub fn to_yaml_stream(&self) -> String {
        format!(
            "---\n{}\n---\n{}\n---\n{}\n",
            self.namespace_yaml.trim_end(),
            self.service_yaml.trim_end(),
            self.deployment_yaml.trim_end()
        )
    }
}

pub struct ManifestAssembler {
    renderer: Arc<dyn TemplateRenderer>,
    stager: ConfigStager,
    sidecars: SidecarResolver,
}

impl ManifestAssembler {
    pub fn new(
        renderer: Arc<dyn TemplateRenderer>,
        secret_store: Arc<dyn SecretBundleStore>,
        sidecars: SidecarResolver,
    ) -> Self {
        Self {
            renderer,
            stager: ConfigStager::new(secret_store),
            sidecars,
        }
    }

    pub fn assemble_namespace(
        &self,
        service: &ServiceDescriptor,
        resolved: &ResolvedConfiguration,
    ) -> Result<String, DeployError> {
        let settings = resolved.service_settings(service)?;
        let bindings = TemplateBindings::new().bind("namespace", settings.namespace());
        Ok(self.renderer.render(ManifestTemplate::Namespace, &bindings)?)
    }

    pub fn assemble_service(
        &self,
        service: &ServiceDescriptor,
        resolved: &ResolvedConfiguration,
    ) -> Result<String, DeployError> {
        let settings = resolved.service_settings(service)?;
        let bindings = TemplateBindings::new()
            .bind("name", service.canonical_name.as_str())
            .bind("namespace", settings.namespace())
            .bind("port", settings.port);
        Ok(self.renderer.render(ManifestTemplate::Service, &bindings)?)
    }

    pub fn assemble_deployment(
        &self,
        service: &ServiceDescriptor,
        details: &DeploymentDetails,
        resolved: &ResolvedConfiguration,
    ) -> Result<String, DeployError> {
        let settings = resolved.service_settings(service)?;
        let namespace = settings.namespace();
        let environment = &details.configuration.environment;
        let custom_sidecars = environment.sidecars_for(&service.service_type);
        let sidecars = self.sidecars.resolve(&resolved.runtime_settings, service);

        let mut staged = self.stager.stage(
            &details.account,
            service,
            &sidecars,
            resolved,
            &details.staging_path(),
            namespace,
        )?;
        staged.extend(scratch_volumes(custom_sidecars));
        let config_sources = staged.into_iter().collect::<UniqueSources>().into_vec();

        let env = merged_env(&config_sources, settings);
        let volumes = pod_volumes(&config_sources, settings, custom_sidecars);

        let replicas = details
            .custom_sizing()
            .and_then(|sizing| sizing.replicas(&service.service_type))
            .unwrap_or(settings.target_size);

        let builder = ContainerBuilder::new(service, details);
        let mut containers = Vec::with_capacity(1 + sidecars.len() + custom_sidecars.len());
        containers.push(builder.build(&service.canonical_name, settings, &config_sources, &env));
        for sidecar in &sidecars {
            let sidecar_settings = resolved.service_settings(&sidecar.service)?;
            containers.push(builder.build(
                &sidecar.service.canonical_name,
                sidecar_settings,
                &config_sources,
                &env,
            ));
        }
        containers.extend(custom_sidecars.iter().map(ContainerBuilder::build_sidecar));

        let init_containers =
            serialize_entries(environment.init_containers_for(&service.service_type))
            .map_err(|reason| DeployError::InvalidInitContainer {
                service: service.canonical_name.clone(),
                reason,
            })?;
        let host_aliases = serialize_entries(environment.host_aliases_for(&service.service_type))
            .map_err(|reason| DeployError::InvalidHostAlias {
                service: service.canonical_name.clone(),
                reason,
            })?;

        let pod = PodSpec {
            containers,
            init_containers,
            host_aliases,
            image_pull_secrets: settings.kubernetes.image_pull_secrets.clone(),
            termination_grace_period_seconds: service.termination_grace_period_seconds,
            volumes,
        };
        let pod_spec = PodSpecRenderer::new(self.renderer.as_ref()).render_pod_spec(&pod)?;

        let version = LabelSanitizer::version_label(&details.configuration.version);
        let annotations: serde_json::Map<String, Value> = settings
            .kubernetes
            .pod_annotations
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let bindings = TemplateBindings::new()
            .bind("name", service.canonical_name.as_str())
            .bind("namespace", namespace)
            .bind("replicas", replicas)
            .bind("version", version.as_str())
            .bind("podAnnotations", Value::Object(annotations))
            .bind("podSpec", pod_spec);
        let manifest = self.renderer.render(ManifestTemplate::Deployment, &bindings)?;

        info!(
            service = %service.canonical_name,
            namespace = %namespace,
            replicas = replicas,
            containers = pod.containers.len(),
            volumes = pod.volumes.len(),
            version = %version,
            "Assembled deployment manifest"
        );
        Ok(manifest)
    }

    pub fn assemble(
        &self,
        service: &ServiceDescriptor,
        details: &DeploymentDetails,
        resolved: &ResolvedConfiguration,
    ) -> Result<ServiceManifests, DeployError> {
        let settings = resolved.service_settings(service)?;
        Ok(ServiceManifests {
            service: service.canonical_name.clone(),
            namespace: settings.namespace().to_string(),
            namespace_yaml: self.assemble_namespace(service, resolved)?,
            service_yaml: self.assemble_service(service, resolved)?,
            deployment_yaml: self.assemble_deployment(service, details, resolved)?,
        })
    }

    /// Assemble every enabled service, in the order given.
    pub fn assemble_all(
        &self,
        services: &[ServiceDescriptor],
        details: &DeploymentDetails,
        resolved: &ResolvedConfiguration,
    ) -> Result<Vec<ServiceManifests>, DeployError> {
        enabled_services(services, resolved)?
            .into_iter()
            .map(|service| self.assemble(service, details, resolved))
            .collect()
    }
}

/// The services whose settings are enabled, in the order given.
pub fn enabled_services<'a>(
    services: &'a [ServiceDescriptor],
    resolved: &ResolvedConfiguration,
) -> Result<Vec<&'a ServiceDescriptor>, DeployError> {
    let mut enabled = Vec::with_capacity(services.len());
    for service in services {
        if resolved.service_settings(service)?.enabled {
            enabled.push(service);
        } else {
            debug!(service = %service.canonical_name, "Skipping disabled service");
        }
    }
    Ok(enabled)
}

/// Empty-dir backing for every custom sidecar that declares a scratch mount.
fn scratch_volumes(custom_sidecars: &[SidecarConfig]) -> impl Iterator<Item = ConfigSource> + '_ {
    custom_sidecars.iter().filter_map(|sidecar| {
        sidecar
            .host_mount_path()
            .map(|mount_path| ConfigSource::empty_dir(&sidecar.name, mount_path))
    })
}

/// Config source env, then extra volume env, then the settings' own env.
/// Later entries win.
pub fn merged_env(
    config_sources: &[ConfigSource],
    settings: &ServiceSettings,
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    for source in config_sources.iter().chain(settings.kubernetes.volumes.iter()) {
        env.extend(source.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    env.extend(settings.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// Config source volumes, then extra volumes, then custom sidecar config-map
/// volumes. The first volume seen for an id wins.
pub fn pod_volumes(
    config_sources: &[ConfigSource],
    settings: &ServiceSettings,
    custom_sidecars: &[SidecarConfig],
) -> Vec<ConfigSource> {
    let mut volumes = UniqueSources::new();
    volumes.extend(config_sources.iter().cloned());
    volumes.extend(settings.kubernetes.volumes.iter().cloned());
    volumes.extend(custom_sidecars.iter().flat_map(|sidecar| {
        sidecar
            .config_map_volume_mounts
            .iter()
            .map(|mount| ConfigSource::config_map(&mount.config_map_name, &mount.mount_path))
    }));
    volumes.into_vec()
}

/// Serialize raw pod entries; an empty list is absent.
fn serialize_entries(entries: &[Value]) -> Result<Option<Vec<String>>, String> {
    if entries.is_empty() {
        return Ok(None);
    }
    entries
        .iter()
        .map(|entry| serde_json::to_string(entry).map_err(|e| format!("{}: {}", entry, e)))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
