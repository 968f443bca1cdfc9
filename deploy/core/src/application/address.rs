// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service addressing and operator connect commands.

use std::sync::Arc;

use crate::domain::cluster::ClusterCommandBuilder;
use crate::domain::deployment::DeploymentDetails;
use crate::domain::error::DeployError;
use crate::domain::service::{RuntimeSettings, ServiceDescriptor};

/// Cluster-internal DNS name: `<service>.<namespace>`.
pub fn build_address(service_name: &str, namespace: &str) -> String {
    format!("{}.{}", service_name, namespace)
}

pub struct ConnectCommandBuilder {
    commands: Arc<dyn ClusterCommandBuilder>,
}

impl ConnectCommandBuilder {
    pub fn new(commands: Arc<dyn ClusterCommandBuilder>) -> Self {
        Self { commands }
    }

    /// Shell command that port-forwards to one running pod of `service`.
    ///
    /// The pod is looked up at execution time through command substitution,
    /// so nothing is queried while the command is built.
    pub fn build(
        &self,
        service: &ServiceDescriptor,
        details: &DeploymentDetails,
        runtime: &RuntimeSettings,
    ) -> Result<String, DeployError> {
        let settings = runtime.service_settings(service)?;
        let namespace = settings.namespace();

        let lookup = self
            .commands
            .pod_lookup_command(&details.account, namespace, &service.canonical_name);
        let pod_ref = format!("$({})", lookup.join(" "));

        let connect = self
            .commands
            .pod_connect_command(&details.account, namespace, &pod_ref, settings.port);
        Ok(connect.join(" "))
    }
}
