// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Config Stager
//!
//! Turns the profiles of a service (and of the sidecars attached to it) into
//! mountable secret bundles, one per output directory, plus one bundle for
//! files the profiles reference verbatim.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Produce the config sources a pod mounts
//! - **Integration:** Bundle persistence is delegated to a [`SecretBundleStore`]

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::config_source::ConfigSource;
use crate::domain::deployment::{KubernetesAccount, ResolvedConfiguration};
use crate::domain::error::DeployError;
use crate::domain::profile::{parent_directory, Profile};
use crate::domain::secret_store::{SecretBundleStore, SecretMountPair};
use crate::domain::service::ServiceDescriptor;
use crate::domain::sidecar::SidecarService;

/// Suffix of every bundle name prefix: `<canonical-name>-files`.
pub const SECRET_NAME_SUFFIX: &str = "files";

pub struct ConfigStager {
    secret_store: Arc<dyn SecretBundleStore>,
}

impl ConfigStager {
    pub fn new(secret_store: Arc<dyn SecretBundleStore>) -> Self {
        Self { secret_store }
    }

    /// Stage every profile of `service` and its `sidecars`.
    ///
    /// Returns the directory bundles in directory order, followed by the
    /// required-files bundle when any profile references extra files.
    pub fn stage(
        &self,
        account: &KubernetesAccount,
        service: &ServiceDescriptor,
        sidecars: &[SidecarService],
        resolved: &ResolvedConfiguration,
        staging_path: &Path,
        namespace: &str,
    ) -> Result<Vec<ConfigSource>, DeployError> {
        let profiles = merge_profiles(service, sidecars, resolved)?;
        let name_prefix = format!("{}-{}", service.canonical_name, SECRET_NAME_SUFFIX);

        let mut by_directory: BTreeMap<String, Vec<&Profile>> = BTreeMap::new();
        let mut required_files = Vec::new();
        let mut seen_required = HashSet::new();
        for profile in profiles.values() {
            by_directory
                .entry(profile.output_directory())
                .or_default()
                .push(profile);

            for file in &profile.required_files {
                if seen_required.insert(file.as_str()) {
                    required_files.push(file.as_str());
                }
            }
        }

        let mut config_sources = Vec::with_capacity(by_directory.len() + 1);
        for (mount_path, members) in &by_directory {
            let files: Vec<SecretMountPair> = members
                .iter()
                .map(|p| SecretMountPair::new(p.staged_file(staging_path), &p.output_file))
                .collect();

            let mut env = BTreeMap::new();
            for profile in members {
                env.extend(profile.env.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            let name = self.secret_store.create_bundle(
                account,
                namespace,
                &service.canonical_name,
                &name_prefix,
                &files,
            )?;
            debug!(
                service = %service.canonical_name,
                bundle = %name,
                mount_path = %mount_path,
                files = files.len(),
                "Staged profile bundle"
            );
            config_sources.push(ConfigSource::secret(name, mount_path.clone(), env));
        }

        if let Some(first) = required_files.first() {
            // All required files of a service are assumed to share the first
            // file's directory.
            let mount_path = parent_directory(first);
            let files: Vec<SecretMountPair> = required_files
                .iter()
                .map(SecretMountPair::verbatim)
                .collect();

            let name = self.secret_store.create_bundle(
                account,
                namespace,
                &service.canonical_name,
                &name_prefix,
                &files,
            )?;
            debug!(
                service = %service.canonical_name,
                bundle = %name,
                mount_path = %mount_path,
                files = files.len(),
                "Staged required files bundle"
            );
            config_sources.push(ConfigSource::secret(name, mount_path, BTreeMap::new()));
        }

        info!(
            service = %service.canonical_name,
            namespace = %namespace,
            bundles = config_sources.len(),
            "Staged service configuration"
        );
        Ok(config_sources)
    }
}

/// The service's own profiles overlaid with its sidecars' profiles, keyed by
/// profile name.
fn merge_profiles(
    service: &ServiceDescriptor,
    sidecars: &[SidecarService],
    resolved: &ResolvedConfiguration,
) -> Result<BTreeMap<String, Profile>, DeployError> {
    let mut profiles = resolved
        .profiles_for(&service.service_type)
        .cloned()
        .unwrap_or_default();

    for sidecar in sidecars {
        for (name, profile) in sidecar.sidecar_profiles(resolved, service) {
            let profile = profile.ok_or_else(|| DeployError::SidecarProfileMissing {
                sidecar: sidecar.service.canonical_name.clone(),
                service: service.canonical_name.clone(),
                profile: name.clone(),
            })?;
            profiles.insert(profile.name.clone(), profile.clone());
        }
    }

    Ok(profiles)
}
