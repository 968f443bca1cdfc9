// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::deployment::KubernetesAccount;

/// A staged file and the path it is mounted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMountPair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl SecretMountPair {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// A file mounted at the same path it is read from.
    pub fn verbatim(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            source: path.clone(),
            destination: path,
        }
    }

    /// Key of the file inside the bundle.
    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.destination.to_string_lossy().into_owned())
    }
}

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("Failed to read staged file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret bundle for {0} has no files")]
    EmptyBundle(String),

    #[error("Failed to encode secret bundle {name}: {reason}")]
    EncodeFailed { name: String, reason: String },
}

/// Persists a set of files as one mountable secret bundle.
///
/// Implementations must return a name that is deterministic for the bundle
/// contents or globally unique, so concurrent assembly of different services
/// never collides.
pub trait SecretBundleStore: Send + Sync {
    fn create_bundle(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        service_name: &str,
        name_prefix: &str,
        files: &[SecretMountPair],
    ) -> Result<String, SecretStoreError>;
}
