// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::config_source::ConfigSource;
use crate::domain::error::DeployError;

/// Namespace used when a service's settings carry no location.
pub const DEFAULT_NAMESPACE: &str = "default";

pub const DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS: u32 = 60;

pub const DEFAULT_SHUTDOWN_SCRIPT: &str = "/opt/spinnaker/scripts/shutdown.sh";

/// Identity of a deployable service plus the fixed traits of its image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    /// Name of the deployment, its primary container and its address
    pub canonical_name: String,

    /// Key under which profiles, sidecars, init containers, host aliases and
    /// custom sizing are declared for this service
    pub service_type: String,

    /// Image repository name
    pub artifact_name: String,

    /// JVM services get container-aware heap options injected
    #[serde(default = "default_true")]
    pub runs_on_jvm: bool,

    #[serde(default = "default_grace_period")]
    pub termination_grace_period_seconds: u32,

    /// Opt into a pre-stop hook running `shutdown_script`
    #[serde(default)]
    pub pre_stop: bool,

    #[serde(default = "default_shutdown_script")]
    pub shutdown_script: String,
}

impl ServiceDescriptor {
    pub fn new(
        canonical_name: impl Into<String>,
        service_type: impl Into<String>,
        artifact_name: impl Into<String>,
    ) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            service_type: service_type.into(),
            artifact_name: artifact_name.into(),
            runs_on_jvm: true,
            termination_grace_period_seconds: DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS,
            pre_stop: false,
            shutdown_script: default_shutdown_script(),
        }
    }

    /// Builder-style opt-in for the pre-stop hook
    pub fn with_pre_stop(mut self) -> Self {
        self.pre_stop = true;
        self
    }

    /// Command run by the pre-stop hook; empty when the service has none.
    pub fn pre_stop_command(&self) -> Vec<String> {
        if self.pre_stop {
            vec!["bash".to_string(), self.shutdown_script.clone()]
        } else {
            Vec::new()
        }
    }
}

/// Runtime configuration of one service for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSettings {
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_endpoint: Option<String>,

    /// Default replica count, overridable through custom sizing
    #[serde(default = "default_target_size")]
    pub target_size: u32,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub monitored: bool,

    /// Fully qualified image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,

    /// Namespace the service is deployed into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub kubernetes: KubernetesSettings,
}

impl ServiceSettings {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            address: None,
            scheme: default_scheme(),
            health_endpoint: None,
            target_size: default_target_size(),
            env: BTreeMap::new(),
            enabled: true,
            monitored: false,
            artifact_id: None,
            location: None,
            kubernetes: KubernetesSettings::default(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Health endpoint, treating an empty path as undeclared.
    pub fn health_endpoint(&self) -> Option<&str> {
        self.health_endpoint.as_deref().filter(|e| !e.is_empty())
    }

    /// Exec readiness check against the service's own health endpoint.
    pub fn readiness_exec_command(&self, health_endpoint: &str) -> Vec<String> {
        vec![
            "wget".to_string(),
            "--no-check-certificate".to_string(),
            "--spider".to_string(),
            "-q".to_string(),
            format!("{}://localhost:{}{}", self.scheme, self.port, health_endpoint),
        ]
    }
}

/// Orchestrator-specific extras of a service's settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSettings {
    #[serde(default)]
    pub image_pull_secrets: Vec<String>,

    /// Extra volumes mounted into every service container
    #[serde(default)]
    pub volumes: Vec<ConfigSource>,

    #[serde(default)]
    pub pod_annotations: BTreeMap<String, String>,
}

/// Settings of every service in the deployment, keyed by service type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeSettings {
    services: BTreeMap<String, ServiceSettings>,
}

impl RuntimeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service_type: impl Into<String>, settings: ServiceSettings) {
        self.services.insert(service_type.into(), settings);
    }

    pub fn get(&self, service_type: &str) -> Option<&ServiceSettings> {
        self.services.get(service_type)
    }

    pub fn service_settings(
        &self,
        service: &ServiceDescriptor,
    ) -> Result<&ServiceSettings, DeployError> {
        self.get(&service.service_type)
            .ok_or_else(|| DeployError::MissingServiceSettings(service.canonical_name.clone()))
    }
}

fn default_true() -> bool {
    true
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_target_size() -> u32 {
    1
}

fn default_grace_period() -> u32 {
    DEFAULT_TERMINATION_GRACE_PERIOD_SECONDS
}

fn default_shutdown_script() -> String {
    DEFAULT_SHUTDOWN_SCRIPT.to_string()
}
