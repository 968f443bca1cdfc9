// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Backing store of a mountable bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSourceKind {
    #[default]
    Secret,
    EmptyDir,
    ConfigMap,
}

/// One mountable bundle: a volume id, where it is mounted, and the
/// environment variables its files imply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSource {
    pub id: String,

    pub mount_path: String,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default, rename = "type")]
    pub kind: ConfigSourceKind,
}

impl ConfigSource {
    pub fn secret(
        id: impl Into<String>,
        mount_path: impl Into<String>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            mount_path: mount_path.into(),
            env,
            kind: ConfigSourceKind::Secret,
        }
    }

    pub fn empty_dir(id: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mount_path: mount_path.into(),
            env: BTreeMap::new(),
            kind: ConfigSourceKind::EmptyDir,
        }
    }

    pub fn config_map(id: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mount_path: mount_path.into(),
            env: BTreeMap::new(),
            kind: ConfigSourceKind::ConfigMap,
        }
    }
}

/// Ordered collection of config sources that keeps the first occurrence of
/// every id.
#[derive(Debug, Clone, Default)]
pub struct UniqueSources {
    seen: HashSet<String>,
    sources: Vec<ConfigSource>,
}

impl UniqueSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a source with the same id is already present.
    pub fn push(&mut self, source: ConfigSource) -> bool {
        if self.seen.contains(&source.id) {
            tracing::debug!(
                id = %source.id,
                mount_path = %source.mount_path,
                "Dropping duplicate config source"
            );
            return false;
        }
        self.seen.insert(source.id.clone());
        self.sources.push(source);
        true
    }

    pub fn extend(&mut self, sources: impl IntoIterator<Item = ConfigSource>) {
        for source in sources {
            self.push(source);
        }
    }

    pub fn into_vec(self) -> Vec<ConfigSource> {
        self.sources
    }
}

impl FromIterator<ConfigSource> for UniqueSources {
    fn from_iter<I: IntoIterator<Item = ConfigSource>>(iter: I) -> Self {
        let mut unique = Self::new();
        unique.extend(iter);
        unique
    }
}
