// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::artifact::ArtifactSource;

/// Pinned version and optional registry of one artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
}

/// Artifact versions declared in a deployment file. One catalog describes
/// one deployment, so the deployment name is not consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCatalog {
    #[serde(default)]
    pub registry: String,

    /// Version used for artifacts without a pin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub pins: BTreeMap<String, ArtifactPin>,
}

impl ArtifactSource for ArtifactCatalog {
    fn artifact_version(&self, _deployment_name: &str, artifact: &str) -> Option<String> {
        self.pins
            .get(artifact)
            .and_then(|pin| pin.version.clone())
            .or_else(|| self.version.clone())
    }

    fn docker_registry(&self, _deployment_name: &str, artifact: &str) -> String {
        self.pins
            .get(artifact)
            .and_then(|pin| pin.registry.clone())
            .unwrap_or_else(|| self.registry.clone())
    }
}
