// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::BTreeMap;

use crate::domain::config_source::ConfigSource;
use crate::domain::sidecar::SecurityContext;
use crate::domain::sizing::ResourceQuantities;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMountSpec {
    pub name: String,
    pub mount_path: String,
}

impl VolumeMountSpec {
    pub fn new(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
        }
    }
}

/// Readiness probe of a service container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSpec {
    Exec { command: Vec<String> },
    TcpSocket { port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSpec {
    pub pre_stop_command: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequirements {
    pub requests: ResourceQuantities,
    pub limits: ResourceQuantities,
}

/// Rendering input for one container of a pod.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub image_id: Option<String>,
    pub port: Option<u16>,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub volume_mounts: Vec<VolumeMountSpec>,
    pub probe: Option<ProbeSpec>,
    pub lifecycle: Option<LifecycleSpec>,
    pub env: BTreeMap<String, String>,
    pub resources: Option<ResourceRequirements>,
    pub security_context: Option<SecurityContext>,
}

/// Rendering input for a whole pod.
///
/// `init_containers` and `host_aliases` hold pre-serialized objects; `None`
/// omits the section from the manifest while `Some(vec![])` renders an empty
/// list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodSpec {
    /// Primary container first, then resolved sidecars, then custom sidecars
    pub containers: Vec<ContainerSpec>,
    pub init_containers: Option<Vec<String>>,
    pub host_aliases: Option<Vec<String>>,
    pub image_pull_secrets: Vec<String>,
    pub termination_grace_period_seconds: u32,
    pub volumes: Vec<ConfigSource>,
}
