// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Manifest Secret Store
//!
//! [`SecretBundleStore`] that turns each bundle into a Kubernetes `Secret`
//! manifest kept in memory, for the CLI to write next to the deployment
//! manifests.
//!
//! Bundle names are `<prefix>-<first 10 hex digits of sha256>` over the
//! bundle's destination paths and contents, so re-staging identical files
//! yields the same name and concurrent assembly of different services never
//! collides.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::domain::deployment::KubernetesAccount;
use crate::domain::secret_store::{SecretBundleStore, SecretMountPair, SecretStoreError};

const NAME_HASH_LENGTH: usize = 10;

/// One staged bundle and its rendered manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSecret {
    pub name: String,
    pub namespace: String,
    pub service: String,
    /// Destination file names held by the bundle
    pub files: Vec<String>,
    pub manifest: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretManifest<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: SecretMetadata<'a>,
    #[serde(rename = "type")]
    secret_type: &'static str,
    data: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct SecretMetadata<'a> {
    name: &'a str,
    namespace: &'a str,
    labels: BTreeMap<&'static str, &'a str>,
}

#[derive(Default)]
pub struct ManifestSecretStore {
    bundles: Mutex<BTreeMap<String, StagedSecret>>,
}

impl ManifestSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every staged bundle, ordered by name.
    pub fn bundles(&self) -> Vec<StagedSecret> {
        self.bundles.lock().values().cloned().collect()
    }

    pub fn bundles_for(&self, service: &str) -> Vec<StagedSecret> {
        self.bundles
            .lock()
            .values()
            .filter(|bundle| bundle.service == service)
            .cloned()
            .collect()
    }

    /// Hashes full destination paths, so identical files mounted into
    /// different directories never share a name.
    fn bundle_name(
        name_prefix: &str,
        files: &[SecretMountPair],
        contents: &[(String, Vec<u8>)],
    ) -> String {
        let mut hasher = Sha256::new();
        for (pair, (_, data)) in files.iter().zip(contents) {
            hasher.update(pair.destination.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            hasher.update(data);
        }
        let digest = hex::encode(hasher.finalize());
        format!("{}-{}", name_prefix, &digest[..NAME_HASH_LENGTH])
    }
}

impl SecretBundleStore for ManifestSecretStore {
    fn create_bundle(
        &self,
        account: &KubernetesAccount,
        namespace: &str,
        service_name: &str,
        name_prefix: &str,
        files: &[SecretMountPair],
    ) -> Result<String, SecretStoreError> {
        if files.is_empty() {
            return Err(SecretStoreError::EmptyBundle(name_prefix.to_string()));
        }

        let contents = files
            .iter()
            .map(|pair| {
                std::fs::read(&pair.source)
                    .map(|data| (pair.file_name(), data))
                    .map_err(|source| SecretStoreError::ReadFailed {
                        path: pair.source.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = Self::bundle_name(name_prefix, files, &contents);
        let data: BTreeMap<String, String> = contents
            .iter()
            .map(|(file_name, data)| (file_name.clone(), STANDARD.encode(data)))
            .collect();

        let manifest = serde_yaml::to_string(&SecretManifest {
            api_version: "v1",
            kind: "Secret",
            metadata: SecretMetadata {
                name: &name,
                namespace,
                labels: BTreeMap::from([
                    ("app", service_name),
                    ("app.kubernetes.io/managed-by", "fleetyard"),
                ]),
            },
            secret_type: "Opaque",
            data,
        })
        .map_err(|e| SecretStoreError::EncodeFailed {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            account = %account.name,
            namespace = %namespace,
            service = %service_name,
            bundle = %name,
            files = contents.len(),
            "Created secret bundle"
        );

        self.bundles.lock().insert(
            name.clone(),
            StagedSecret {
                name: name.clone(),
                namespace: namespace.to_string(),
                service: service_name.to_string(),
                files: contents.into_iter().map(|(file_name, _)| file_name).collect(),
                manifest,
            },
        );
        Ok(name)
    }
}
