// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A rendered configuration file of a service and where it lands in the
/// container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique within a service; also the file name under the staging path
    pub name: String,

    /// Absolute path of the file inside the container
    pub output_file: String,

    /// Environment variables the file implies
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Files the profile references that must be mounted verbatim
    #[serde(default)]
    pub required_files: Vec<String>,
}

impl Profile {
    pub fn new(name: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output_file: output_file.into(),
            env: BTreeMap::new(),
            required_files: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_required_file(mut self, path: impl Into<String>) -> Self {
        self.required_files.push(path.into());
        self
    }

    /// Where the rendered profile was staged on the operator's machine.
    pub fn staged_file(&self, staging_path: &Path) -> PathBuf {
        staging_path.join(&self.name)
    }

    /// Directory the profile is mounted into.
    pub fn output_directory(&self) -> String {
        parent_directory(&self.output_file)
    }
}

/// Parent directory of `path`, `/` for bare file names.
pub fn parent_directory(path: &str) -> String {
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_directory() {
        let profile = Profile::new("gate.yml", "/opt/spinnaker/config/gate.yml");
        assert_eq!(profile.output_directory(), "/opt/spinnaker/config");
        assert_eq!(parent_directory("gate.yml"), "/");
    }

    #[test]
    fn test_staged_file() {
        let profile = Profile::new("gate-local.yml", "/opt/spinnaker/config/gate-local.yml");
        assert_eq!(
            profile.staged_file(Path::new("/tmp/staging/prod")),
            PathBuf::from("/tmp/staging/prod/gate-local.yml")
        );
    }
}
