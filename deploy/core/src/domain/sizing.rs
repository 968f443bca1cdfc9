// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource quantities (`cpu`, `memory`, ...) as written by the operator.
/// Values are kept verbatim so that both `1` and `"500m"` survive rendering.
pub type ResourceQuantities = BTreeMap<String, serde_json::Value>;

/// Operator overrides for one container or service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSizing {
    #[serde(default)]
    pub requests: ResourceQuantities,

    #[serde(default)]
    pub limits: ResourceQuantities,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
}

/// Custom sizing keyed by container name or service type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomSizing {
    components: BTreeMap<String, ComponentSizing>,
}

impl CustomSizing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: impl Into<String>, sizing: ComponentSizing) {
        self.components.insert(component.into(), sizing);
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSizing> {
        self.components.get(name)
    }

    /// Sizing for a container: its own entry first, then the entry of the
    /// service it belongs to.
    pub fn lookup(&self, container_name: &str, service_type: &str) -> Option<&ComponentSizing> {
        self.component(container_name)
            .or_else(|| self.component(service_type))
    }

    /// Replica override declared for a service.
    pub fn replicas(&self, service_type: &str) -> Option<u32> {
        self.component(service_type).and_then(|sizing| sizing.replicas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sizing() -> CustomSizing {
        serde_yaml::from_str(
            r#"
myservice:
  requests:
    cpu: "1"
  replicas: 3
myservice-monitoring:
  limits:
    memory: 512Mi
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_container_entry_wins() {
        let sizing = sizing();
        let found = sizing.lookup("myservice-monitoring", "myservice").unwrap();
        assert_eq!(found.limits.get("memory"), Some(&json!("512Mi")));
        assert!(found.requests.is_empty());
    }

    #[test]
    fn test_falls_back_to_service_entry() {
        let sizing = sizing();
        let found = sizing.lookup("myservice-sidecar", "myservice").unwrap();
        assert_eq!(found.requests.get("cpu"), Some(&json!("1")));
    }

    #[test]
    fn test_no_entry() {
        let sizing = sizing();
        assert!(sizing.lookup("other", "other").is_none());
    }

    #[test]
    fn test_replicas() {
        let sizing = sizing();
        assert_eq!(sizing.replicas("myservice"), Some(3));
        assert_eq!(sizing.replicas("myservice-monitoring"), None);
        assert_eq!(sizing.replicas("missing"), None);
    }
}
