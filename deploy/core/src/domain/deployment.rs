// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::error::DeployError;
use crate::domain::profile::Profile;
use crate::domain::service::{RuntimeSettings, ServiceDescriptor, ServiceSettings};
use crate::domain::sidecar::SidecarConfig;
use crate::domain::sizing::CustomSizing;

/// Cluster credentials the deployment targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesAccount {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_file: Option<String>,
}

/// Per-service-type additions to the pods of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEnvironment {
    #[serde(default)]
    pub sidecars: BTreeMap<String, Vec<SidecarConfig>>,

    /// Raw init container objects, passed through to the pod spec
    #[serde(default)]
    pub init_containers: BTreeMap<String, Vec<serde_json::Value>>,

    /// Raw host alias objects, passed through to the pod spec
    #[serde(default)]
    pub host_aliases: BTreeMap<String, Vec<serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sizing: Option<CustomSizing>,
}

impl DeploymentEnvironment {
    pub fn sidecars_for(&self, service_type: &str) -> &[SidecarConfig] {
        self.sidecars.get(service_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn init_containers_for(&self, service_type: &str) -> &[serde_json::Value] {
        self.init_containers.get(service_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn host_aliases_for(&self, service_type: &str) -> &[serde_json::Value] {
        self.host_aliases.get(service_type).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfiguration {
    /// Deployment name, used to scope staging paths and artifact lookups
    pub name: String,

    /// Release version, rendered as the version label
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub environment: DeploymentEnvironment,
}

/// Everything about the target of one deployment run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentDetails {
    pub account: KubernetesAccount,
    pub configuration: DeploymentConfiguration,
    /// Root under which each deployment stages its rendered profiles
    pub staging_root: PathBuf,
}

impl DeploymentDetails {
    pub fn staging_path(&self) -> PathBuf {
        self.staging_root.join(&self.configuration.name)
    }

    pub fn custom_sizing(&self) -> Option<&CustomSizing> {
        self.configuration.environment.custom_sizing.as_ref()
    }
}

/// Settings and profiles of every service, resolved ahead of assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfiguration {
    pub runtime_settings: RuntimeSettings,
    /// Profiles keyed by service type, then profile name
    pub profiles: BTreeMap<String, BTreeMap<String, Profile>>,
}

impl ResolvedConfiguration {
    pub fn service_settings(
        &self,
        service: &ServiceDescriptor,
    ) -> Result<&ServiceSettings, DeployError> {
        self.runtime_settings.service_settings(service)
    }

    pub fn profiles_for(&self, service_type: &str) -> Option<&BTreeMap<String, Profile>> {
        self.profiles.get(service_type)
    }

    pub fn add_profile(&mut self, service_type: impl Into<String>, profile: Profile) {
        self.profiles
            .entry(service_type.into())
            .or_default()
            .insert(profile.name.clone(), profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_scoped_by_deployment() {
        let details = DeploymentDetails {
            configuration: DeploymentConfiguration {
                name: "prod".to_string(),
                ..Default::default()
            },
            staging_root: PathBuf::from("/tmp/staging"),
            ..Default::default()
        };
        assert_eq!(details.staging_path(), PathBuf::from("/tmp/staging/prod"));
    }

    #[test]
    fn test_environment_lookups_default_to_empty() {
        let environment: DeploymentEnvironment = serde_yaml::from_str(
            r#"
sidecars:
  gate:
    - name: logshipper
      dockerImage: fluent/fluent-bit:2.2
initContainers:
  gate:
    - name: migrate
      image: busybox
"#,
        )
        .unwrap();

        assert_eq!(environment.sidecars_for("gate").len(), 1);
        assert!(environment.sidecars_for("deck").is_empty());
        assert_eq!(environment.init_containers_for("gate").len(), 1);
        assert!(environment.host_aliases_for("gate").is_empty());
        assert!(environment.custom_sizing.is_none());
    }
}
