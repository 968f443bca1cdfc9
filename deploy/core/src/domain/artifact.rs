// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt;

/// Prefix marking a locally built artifact version.
pub const LOCAL_VERSION_PREFIX: &str = "local:";

/// Looks up where a service's image lives and which version to deploy.
pub trait ArtifactSource: Send + Sync {
    fn artifact_version(&self, deployment_name: &str, artifact: &str) -> Option<String>;

    fn docker_registry(&self, deployment_name: &str, artifact: &str) -> String;
}

/// `registry/repository:tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: String,
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Build a reference, stripping the `local:` marker from the version.
    pub fn new(registry: impl Into<String>, repository: impl Into<String>, version: &str) -> Self {
        let tag = version.strip_prefix(LOCAL_VERSION_PREFIX).unwrap_or(version);
        Self {
            registry: registry.into(),
            repository: repository.into(),
            tag: tag.to_string(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.trim_end_matches('/');
        if registry.is_empty() {
            write!(f, "{}:{}", self.repository, self.tag)
        } else {
            write!(f, "{}/{}:{}", registry, self.repository, self.tag)
        }
    }
}
