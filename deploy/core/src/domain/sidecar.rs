// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::deployment::ResolvedConfiguration;
use crate::domain::profile::Profile;
use crate::domain::service::ServiceDescriptor;

/// Placeholder in a sidecar profile name replaced by the host's service type.
pub const SERVICE_PLACEHOLDER: &str = "{service}";

/// Operator-declared extra container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarConfig {
    pub name: String,

    pub docker_image: String,

    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    #[serde(default)]
    pub config_map_volume_mounts: Vec<ConfigMapVolumeMount>,

    /// Scratch directory shared with the pod, backed by an empty dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

impl SidecarConfig {
    pub fn new(name: impl Into<String>, docker_image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docker_image: docker_image.into(),
            command: Vec::new(),
            args: Vec::new(),
            env: BTreeMap::new(),
            security_context: None,
            config_map_volume_mounts: Vec::new(),
            mount_path: None,
        }
    }

    /// Declared mount path, treating an empty path as undeclared.
    pub fn host_mount_path(&self) -> Option<&str> {
        self.mount_path.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default)]
    pub privileged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeMount {
    pub config_map_name: String,
    pub mount_path: String,
}

/// A system-provided service attached to other services' pods (for example
/// the monitoring daemon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarService {
    #[serde(flatten)]
    pub service: ServiceDescriptor,

    /// Profiles of the sidecar's own service type the host must mount.
    /// `{service}` expands to the host's service type.
    #[serde(default)]
    pub profile_names: Vec<String>,
}

impl SidecarService {
    pub fn new(service: ServiceDescriptor, profile_names: Vec<String>) -> Self {
        Self { service, profile_names }
    }

    /// Profile names for a given host, with the placeholder expanded.
    pub fn profile_names_for(&self, host: &ServiceDescriptor) -> Vec<String> {
        self.profile_names
            .iter()
            .map(|name| name.replace(SERVICE_PLACEHOLDER, &host.service_type))
            .collect()
    }

    /// Resolve the profiles this sidecar contributes to `host`. A `None`
    /// entry means the profile was required but never generated.
    pub fn sidecar_profiles<'a>(
        &self,
        resolved: &'a ResolvedConfiguration,
        host: &ServiceDescriptor,
    ) -> Vec<(String, Option<&'a Profile>)> {
        let profiles = resolved.profiles_for(&self.service.service_type);
        self.profile_names_for(host)
            .into_iter()
            .map(|name| {
                let profile = profiles.and_then(|p| p.get(&name));
                (name, profile)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitoring() -> SidecarService {
        SidecarService::new(
            ServiceDescriptor::new("monitoring-daemon", "monitoring-daemon", "monitoring-daemon"),
            vec!["monitoring.yml".to_string(), "registry/{service}.yml".to_string()],
        )
    }

    #[test]
    fn test_profile_names_expand_host() {
        let host = ServiceDescriptor::new("gate", "gate", "gate");
        assert_eq!(
            monitoring().profile_names_for(&host),
            vec!["monitoring.yml", "registry/gate.yml"]
        );
    }

    #[test]
    fn test_sidecar_profiles_reports_missing() {
        let host = ServiceDescriptor::new("gate", "gate", "gate");
        let mut resolved = ResolvedConfiguration::default();
        resolved.add_profile(
            "monitoring-daemon",
            Profile::new("monitoring.yml", "/opt/monitoring/config/monitoring.yml"),
        );

        let profiles = monitoring().sidecar_profiles(&resolved, &host);
        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].1.is_some());
        assert_eq!(profiles[1].0, "registry/gate.yml");
        assert!(profiles[1].1.is_none());
    }

    #[test]
    fn test_host_mount_path() {
        let mut sidecar = SidecarConfig::new("logshipper", "fluent/fluent-bit:2.2");
        assert_eq!(sidecar.host_mount_path(), None);
        sidecar.mount_path = Some(String::new());
        assert_eq!(sidecar.host_mount_path(), None);
        sidecar.mount_path = Some("/var/log/app".to_string());
        assert_eq!(sidecar.host_mount_path(), Some("/var/log/app"));
    }
}
