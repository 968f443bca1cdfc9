// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::deployment::KubernetesAccount;

/// Builds the orchestrator CLI invocations operators use to reach a running
/// service.
pub trait ClusterCommandBuilder: Send + Sync {
    /// Prints the name of one running pod of `service_name`.
    fn pod_lookup_command(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        service_name: &str,
    ) -> Vec<String>;

    /// Opens a port-forward session to `pod_ref`.
    fn pod_connect_command(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        pod_ref: &str,
        port: u16,
    ) -> Vec<String>;
}
