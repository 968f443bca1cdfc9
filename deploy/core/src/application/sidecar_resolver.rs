// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Sidecar Resolver
//!
//! Decides which system sidecars are attached to a service's pod. Rules are
//! evaluated in registration order, so the sidecar order in the rendered pod
//! spec is reproducible.

use crate::domain::service::{RuntimeSettings, ServiceDescriptor};
use crate::domain::sidecar::SidecarService;

/// Decides whether `sidecar` is attached to `host`.
pub type SidecarPredicate =
    Box<dyn Fn(&RuntimeSettings, &ServiceDescriptor, &SidecarService) -> bool + Send + Sync>;

struct SidecarRule {
    sidecar: SidecarService,
    predicate: SidecarPredicate,
}

#[derive(Default)]
pub struct SidecarResolver {
    rules: Vec<SidecarRule>,
}

impl SidecarResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a conditionally attached sidecar.
    pub fn with_rule(mut self, sidecar: SidecarService, predicate: SidecarPredicate) -> Self {
        self.rules.push(SidecarRule { sidecar, predicate });
        self
    }

    /// Attach the monitoring daemon to monitored services while it is enabled.
    pub fn with_monitoring(self, monitoring: SidecarService) -> Self {
        self.with_rule(monitoring, Box::new(monitoring_attached))
    }

    pub fn resolve(
        &self,
        runtime: &RuntimeSettings,
        service: &ServiceDescriptor,
    ) -> Vec<SidecarService> {
        self.rules
            .iter()
            .filter(|rule| (rule.predicate)(runtime, service, &rule.sidecar))
            .map(|rule| {
                tracing::debug!(
                    service = %service.canonical_name,
                    sidecar = %rule.sidecar.service.canonical_name,
                    "Attaching sidecar"
                );
                rule.sidecar.clone()
            })
            .collect()
    }
}

/// Monitoring is globally enabled and the host opts into being monitored.
pub fn monitoring_attached(
    runtime: &RuntimeSettings,
    host: &ServiceDescriptor,
    monitoring: &SidecarService,
) -> bool {
    let enabled = runtime
        .get(&monitoring.service.service_type)
        .map(|settings| settings.enabled)
        .unwrap_or(false);
    let monitored = runtime
        .get(&host.service_type)
        .map(|settings| settings.monitored)
        .unwrap_or(false);
    enabled && monitored
}
