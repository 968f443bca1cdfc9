// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pod Spec Renderer
//!
//! Turns [`ContainerSpec`]s, config sources and [`PodSpec`]s into manifest
//! fragments through the [`TemplateRenderer`]. Every fragment is rendered
//! bottom-up and handed to its parent template as already-rendered text.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::domain::config_source::{ConfigSource, ConfigSourceKind};
use crate::domain::container::{
    ContainerSpec, LifecycleSpec, PodSpec, ProbeSpec, ResourceRequirements,
};
use crate::domain::sidecar::SecurityContext;
use crate::domain::template::{ManifestTemplate, RenderError, TemplateBindings, TemplateRenderer};

pub struct PodSpecRenderer<'a> {
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> PodSpecRenderer<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer) -> Self {
        Self { renderer }
    }

    pub fn render_pod_spec(&self, pod: &PodSpec) -> Result<String, RenderError> {
        let containers = pod
            .containers
            .iter()
            .map(|container| self.render_container(container))
            .collect::<Result<Vec<_>, _>>()?;
        let volumes = pod
            .volumes
            .iter()
            .map(|volume| self.render_volume(volume))
            .collect::<Result<Vec<_>, _>>()?;

        let bindings = TemplateBindings::new()
            .bind("containers", containers)
            .bind_opt("initContainers", pod.init_containers.clone())
            .bind_opt("hostAliases", pod.host_aliases.clone())
            .bind("imagePullSecrets", pod.image_pull_secrets.clone())
            .bind("terminationGracePeriodSeconds", pod.termination_grace_period_seconds)
            .bind("volumes", volumes);
        self.renderer.render(ManifestTemplate::PodSpec, &bindings)
    }

    pub fn render_container(&self, container: &ContainerSpec) -> Result<String, RenderError> {
        let volume_mounts = container
            .volume_mounts
            .iter()
            .map(|mount| {
                let bindings = TemplateBindings::new()
                    .bind("name", mount.name.as_str())
                    .bind("mountPath", mount.mount_path.as_str());
                self.renderer.render(ManifestTemplate::VolumeMount, &bindings)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let port = container
            .port
            .map(|port| {
                self.renderer
                    .render(ManifestTemplate::Port, &TemplateBindings::new().bind("port", port))
            })
            .transpose()?;

        let bindings = TemplateBindings::new()
            .bind("name", container.name.as_str())
            .bind_opt("image", container.image_id.clone())
            .bind_opt("command", non_empty(&container.command))
            .bind_opt("args", non_empty(&container.args))
            .bind_opt("port", port)
            .bind("volumeMounts", volume_mounts)
            .bind("env", env_entries(&container.env))
            .bind_opt(
                "readinessProbe",
                container.probe.as_ref().map(|p| self.render_probe(p)).transpose()?,
            )
            .bind_opt(
                "lifecycle",
                container.lifecycle.as_ref().map(|l| self.render_lifecycle(l)).transpose()?,
            )
            .bind_opt(
                "resources",
                container.resources.as_ref().map(|r| self.render_resources(r)).transpose()?,
            )
            .bind_opt(
                "securityContext",
                container
                    .security_context
                    .as_ref()
                    .map(|s| self.render_security_context(s))
                    .transpose()?,
            );
        self.renderer.render(ManifestTemplate::Container, &bindings)
    }

    pub fn render_volume(&self, source: &ConfigSource) -> Result<String, RenderError> {
        let template = match source.kind {
            ConfigSourceKind::Secret => ManifestTemplate::SecretVolume,
            ConfigSourceKind::EmptyDir => ManifestTemplate::EmptyDirVolume,
            ConfigSourceKind::ConfigMap => ManifestTemplate::ConfigMapVolume,
        };
        self.renderer
            .render(template, &TemplateBindings::new().bind("name", source.id.as_str()))
    }

    fn render_probe(&self, probe: &ProbeSpec) -> Result<String, RenderError> {
        match probe {
            ProbeSpec::Exec { command } => self.renderer.render(
                ManifestTemplate::ExecReadinessProbe,
                &TemplateBindings::new().bind("command", command.clone()),
            ),
            ProbeSpec::TcpSocket { port } => self.renderer.render(
                ManifestTemplate::TcpSocketReadinessProbe,
                &TemplateBindings::new().bind("port", *port),
            ),
        }
    }

    fn render_lifecycle(&self, lifecycle: &LifecycleSpec) -> Result<String, RenderError> {
        self.renderer.render(
            ManifestTemplate::Lifecycle,
            &TemplateBindings::new().bind("command", lifecycle.pre_stop_command.clone()),
        )
    }

    fn render_resources(&self, resources: &ResourceRequirements) -> Result<String, RenderError> {
        let bindings = TemplateBindings::new()
            .bind("requests", Value::Object(resources.requests.clone().into_iter().collect()))
            .bind("limits", Value::Object(resources.limits.clone().into_iter().collect()));
        self.renderer.render(ManifestTemplate::Resources, &bindings)
    }

    fn render_security_context(&self, context: &SecurityContext) -> Result<String, RenderError> {
        self.renderer.render(
            ManifestTemplate::SecurityContext,
            &TemplateBindings::new().bind("privileged", context.privileged),
        )
    }
}

/// Environment as the orchestrator's ordered `name`/`value` list.
pub fn env_entries(env: &BTreeMap<String, String>) -> Vec<Value> {
    env.iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect()
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
