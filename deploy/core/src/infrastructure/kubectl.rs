// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::cluster::ClusterCommandBuilder;
use crate::domain::deployment::KubernetesAccount;

/// Builds `kubectl` invocations scoped to an account's kubeconfig and context.
#[derive(Debug, Clone)]
pub struct KubectlCommandBuilder {
    binary: String,
}

impl Default for KubectlCommandBuilder {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
        }
    }
}

impl KubectlCommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different client binary (for example a wrapper script).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn base_command(&self, account: &KubernetesAccount, namespace: &str) -> Vec<String> {
        let mut command = vec![self.binary.clone()];
        if let Some(kubeconfig) = account.kubeconfig_file.as_deref().filter(|f| !f.is_empty()) {
            command.push("--kubeconfig".to_string());
            command.push(kubeconfig.to_string());
        }
        if let Some(context) = account.context.as_deref().filter(|c| !c.is_empty()) {
            command.push("--context".to_string());
            command.push(context.to_string());
        }
        command.push("-n".to_string());
        command.push(namespace.to_string());
        command
    }
}

impl ClusterCommandBuilder for KubectlCommandBuilder {
    fn pod_lookup_command(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        service_name: &str,
    ) -> Vec<String> {
        let mut command = self.base_command(account, namespace);
        command.extend([
            "get".to_string(),
            "pods".to_string(),
            "-l".to_string(),
            format!("cluster={}", service_name),
            "-o=jsonpath='{.items[0].metadata.name}'".to_string(),
        ]);
        command
    }

    fn pod_connect_command(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        pod_ref: &str,
        port: u16,
    ) -> Vec<String> {
        let mut command = self.base_command(account, namespace);
        command.extend(["port-forward".to_string(), pod_ref.to_string(), port.to_string()]);
        command
    }
}
