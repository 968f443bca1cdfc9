// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared fixtures for the manifest assembly integration tests.

#![allow(dead_code)]

use fleetyard_core::domain::deployment::{
    DeploymentDetails, KubernetesAccount, ResolvedConfiguration,
};
use fleetyard_core::domain::profile::Profile;
use fleetyard_core::domain::secret_store::{SecretBundleStore, SecretMountPair, SecretStoreError};
use fleetyard_core::domain::service::{ServiceDescriptor, ServiceSettings};
use fleetyard_core::domain::sidecar::SidecarService;
use fleetyard_core::application::{ManifestAssembler, SidecarResolver};
use fleetyard_core::infrastructure::HandlebarsTemplateRenderer;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// One recorded `create_bundle` call.
#[derive(Debug, Clone)]
pub struct BundleCall {
    pub namespace: String,
    pub service: String,
    pub name_prefix: String,
    pub files: Vec<SecretMountPair>,
}

/// Secret store that names bundles `<prefix>-<call number>` without
/// touching the filesystem.
#[derive(Default)]
pub struct RecordingSecretStore {
    pub calls: Mutex<Vec<BundleCall>>,
}

impl SecretBundleStore for RecordingSecretStore {
    fn create_bundle(
        &self,
        _account: &KubernetesAccount,
        namespace: &str,
        service_name: &str,
        name_prefix: &str,
        files: &[SecretMountPair],
    ) -> Result<String, SecretStoreError> {
        let mut calls = self.calls.lock();
        calls.push(BundleCall {
            namespace: namespace.to_string(),
            service: service_name.to_string(),
            name_prefix: name_prefix.to_string(),
            files: files.to_vec(),
        });
        Ok(format!("{}-{}", name_prefix, calls.len()))
    }
}

pub fn gate() -> ServiceDescriptor {
    ServiceDescriptor::new("gate", "gate", "gate")
}

pub fn gate_settings() -> ServiceSettings {
    let mut settings = ServiceSettings::new(8084);
    settings.health_endpoint = Some("/health".to_string());
    settings.location = Some("spinnaker".to_string());
    settings.artifact_id =
        Some("us-docker.pkg.dev/spinnaker-community/docker/gate:1.31.0".to_string());
    settings
}

pub fn monitoring_daemon() -> SidecarService {
    SidecarService::new(
        ServiceDescriptor::new("monitoring-daemon", "monitoring-daemon", "monitoring-daemon"),
        vec!["registry/{service}.yml".to_string()],
    )
}

/// Gate with one profile under `/opt/spinnaker/config`.
pub fn gate_configuration() -> ResolvedConfiguration {
    let mut resolved = ResolvedConfiguration::default();
    resolved.runtime_settings.insert("gate", gate_settings());
    resolved.add_profile("gate", Profile::new("gate.yml", "/opt/spinnaker/config/gate.yml"));
    resolved
}

pub fn details() -> DeploymentDetails {
    let mut details = DeploymentDetails::default();
    details.configuration.name = "prod".to_string();
    details.configuration.version = "1.31.0".to_string();
    details.staging_root = PathBuf::from("/tmp/fleetyard-staging");
    details
}

pub fn assembler(store: Arc<RecordingSecretStore>, sidecars: SidecarResolver) -> ManifestAssembler {
    let renderer = HandlebarsTemplateRenderer::new().expect("embedded templates compile");
    ManifestAssembler::new(Arc::new(renderer), store, sidecars)
}

pub fn parse(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text)
        .unwrap_or_else(|e| panic!("rendered manifest is not YAML: {}\n{}", e, text))
}

/// Pod spec of a rendered deployment manifest.
pub fn pod_spec(deployment: &serde_yaml::Value) -> &serde_yaml::Value {
    &deployment["spec"]["template"]["spec"]
}

pub fn container_names(pod: &serde_yaml::Value) -> Vec<String> {
    pod["containers"]
        .as_sequence()
        .map(|containers| {
            containers
                .iter()
                .filter_map(|c| c["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn env_value<'a>(container: &'a serde_yaml::Value, name: &str) -> Option<&'a str> {
    container["env"]
        .as_sequence()?
        .iter()
        .find(|entry| entry["name"].as_str() == Some(name))
        .and_then(|entry| entry["value"].as_str())
}

/// `(container, mount)` pairs whose volume is not declared by the pod.
pub fn dangling_mounts(pod: &serde_yaml::Value) -> Vec<(String, String)> {
    let volumes: Vec<&str> = pod["volumes"]
        .as_sequence()
        .map(|volumes| volumes.iter().filter_map(|v| v["name"].as_str()).collect())
        .unwrap_or_default();

    let mut dangling = Vec::new();
    for container in pod["containers"].as_sequence().into_iter().flatten() {
        let container_name = container["name"].as_str().unwrap_or_default();
        for mount in container["volumeMounts"].as_sequence().into_iter().flatten() {
            let name = mount["name"].as_str().unwrap_or_default();
            if !volumes.contains(&name) {
                dangling.push((container_name.to_string(), name.to_string()));
            }
        }
    }
    dangling
}
