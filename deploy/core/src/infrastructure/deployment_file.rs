// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deployment File
//!
//! YAML description of one deployment run: target account, services with
//! their settings and profiles, the monitoring sidecar, per-service pod
//! additions and artifact versions.
//!
//! # Discovery
//!
//! 1. `--config` on the command line (fails if missing or invalid)
//! 2. `FLEETYARD_CONFIG_PATH` environment variable
//! 3. `./fleetyard.yaml`
//! 4. `~/.fleetyard/config.yaml`
//!
//! # Environment Overrides
//!
//! - `FLEETYARD_STAGING_ROOT` replaces `stagingRoot`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::service_settings::ServiceSettingsBuilder;
use crate::application::sidecar_resolver::SidecarResolver;
use crate::domain::deployment::{
    DeploymentConfiguration, DeploymentDetails, DeploymentEnvironment, KubernetesAccount,
    ResolvedConfiguration,
};
use crate::domain::error::DeployError;
use crate::domain::profile::Profile;
use crate::domain::service::{
    RuntimeSettings, ServiceDescriptor, ServiceSettings, DEFAULT_NAMESPACE,
};
use crate::domain::sidecar::SidecarService;
use crate::infrastructure::artifact_catalog::ArtifactCatalog;

pub const CONFIG_PATH_ENV: &str = "FLEETYARD_CONFIG_PATH";
pub const STAGING_ROOT_ENV: &str = "FLEETYARD_STAGING_ROOT";
pub const DEFAULT_CONFIG_FILE: &str = "fleetyard.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read deployment file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse deployment file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("No deployment file found (set FLEETYARD_CONFIG_PATH or create ./fleetyard.yaml)")]
    NotFound,

    #[error("Invalid deployment file: {0}")]
    Invalid(String),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// One deployable service: identity, declared settings and profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    #[serde(flatten)]
    pub descriptor: ServiceDescriptor,

    pub settings: ServiceSettings,

    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// The monitoring daemon attached to monitored services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringEntry {
    #[serde(flatten)]
    pub sidecar: SidecarService,

    pub settings: ServiceSettings,

    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentFile {
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_root: Option<PathBuf>,

    /// Namespace for services that declare no location
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default)]
    pub account: KubernetesAccount,

    #[serde(default)]
    pub artifacts: ArtifactCatalog,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringEntry>,

    #[serde(default)]
    pub services: Vec<ServiceEntry>,

    #[serde(default)]
    pub environment: DeploymentEnvironment,
}

/// A deployment file resolved into engine inputs.
#[derive(Debug, Clone)]
pub struct ResolvedDeployment {
    pub details: DeploymentDetails,
    pub resolved: ResolvedConfiguration,
    /// Services in declaration order
    pub services: Vec<ServiceDescriptor>,
    pub monitoring: Option<SidecarService>,
}

impl ResolvedDeployment {
    pub fn service(&self, canonical_name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.canonical_name == canonical_name)
    }

    /// Sidecar rules for this deployment.
    pub fn sidecar_resolver(&self) -> SidecarResolver {
        match &self.monitoring {
            Some(monitoring) => SidecarResolver::new().with_monitoring(monitoring.clone()),
            None => SidecarResolver::new(),
        }
    }
}

impl DeploymentFile {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warn!("{} points at missing file {:?}", CONFIG_PATH_ENV, path);
        }

        let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".fleetyard").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load from an explicit path, or discover one. Environment overrides
    /// are applied and the result is validated.
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match cli_path {
            Some(path) => {
                info!("Loading deployment file from explicit path: {:?}", path);
                path
            }
            None => {
                let path = Self::discover_config().ok_or(ConfigError::NotFound)?;
                info!("Loading deployment file from discovered path: {:?}", path);
                path
            }
        };

        let mut file = Self::from_yaml_file(&path)?;
        file.apply_env_overrides();
        file.validate()?;
        Ok(file)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_staging_root_override(std::env::var(STAGING_ROOT_ENV).ok());
    }

    fn apply_staging_root_override(&mut self, value: Option<String>) {
        match value {
            Some(root) if !root.trim().is_empty() => {
                info!("Environment override: {}={}", STAGING_ROOT_ENV, root);
                self.staging_root = Some(PathBuf::from(root));
            }
            Some(_) => warn!("Ignoring empty {}", STAGING_ROOT_ENV),
            None => {}
        }
    }

    /// Staging root, defaulting to `~/.fleetyard/staging`.
    pub fn staging_root(&self) -> PathBuf {
        self.staging_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".fleetyard")
                .join("staging")
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("deployment name must not be empty".to_string()));
        }

        let mut names = HashSet::new();
        let mut types = HashSet::new();
        let descriptors = self
            .services
            .iter()
            .map(|s| (&s.descriptor, &s.settings))
            .chain(self.monitoring.iter().map(|m| (&m.sidecar.service, &m.settings)));
        for (descriptor, settings) in descriptors {
            if descriptor.canonical_name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "service canonicalName must not be empty".to_string(),
                ));
            }
            if settings.port == 0 {
                return Err(ConfigError::Invalid(format!(
                    "service {} must declare a non-zero port",
                    descriptor.canonical_name
                )));
            }
            if !names.insert(descriptor.canonical_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "service {} is declared more than once",
                    descriptor.canonical_name
                )));
            }
            if !types.insert(descriptor.service_type.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "service type {} is declared more than once",
                    descriptor.service_type
                )));
            }
        }

        for (service_type, sidecars) in &self.environment.sidecars {
            let reserved: HashSet<&str> = self
                .services
                .iter()
                .filter(|s| &s.descriptor.service_type == service_type)
                .map(|s| s.descriptor.canonical_name.as_str())
                .chain(self.monitoring.iter().map(|m| m.sidecar.service.canonical_name.as_str()))
                .collect();

            let mut seen = HashSet::new();
            for sidecar in sidecars {
                if reserved.contains(sidecar.name.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "sidecar {} of {} collides with a service container name",
                        sidecar.name, service_type
                    )));
                }
                if !seen.insert(sidecar.name.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "sidecar {} is declared more than once for {}",
                        sidecar.name, service_type
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve settings, profiles and sidecars into engine inputs.
    pub fn resolve(&self) -> Result<ResolvedDeployment, ConfigError> {
        let settings_builder = ServiceSettingsBuilder::new(Arc::new(self.artifacts.clone()));
        let mut runtime_settings = RuntimeSettings::new();
        let mut resolved = ResolvedConfiguration::default();

        let entries = self
            .services
            .iter()
            .map(|s| (&s.descriptor, &s.settings, &s.profiles))
            .chain(
                self.monitoring
                    .iter()
                    .map(|m| (&m.sidecar.service, &m.settings, &m.profiles)),
            );
        for (descriptor, settings, profiles) in entries {
            let settings =
                settings_builder.build(descriptor, settings, &self.name, &self.location)?;
            runtime_settings.insert(descriptor.service_type.clone(), settings);
            for profile in profiles {
                resolved.add_profile(descriptor.service_type.clone(), profile.clone());
            }
        }
        resolved.runtime_settings = runtime_settings;

        let details = DeploymentDetails {
            account: self.account.clone(),
            configuration: DeploymentConfiguration {
                name: self.name.clone(),
                version: self.version.clone(),
                environment: self.environment.clone(),
            },
            staging_root: self.staging_root(),
        };

        info!(
            deployment = %self.name,
            services = self.services.len(),
            monitoring = self.monitoring.is_some(),
            "Resolved deployment file"
        );
        Ok(ResolvedDeployment {
            details,
            resolved,
            services: self.services.iter().map(|s| s.descriptor.clone()).collect(),
            monitoring: self.monitoring.as_ref().map(|m| m.sidecar.clone()),
        })
    }
}

fn default_location() -> String {
    DEFAULT_NAMESPACE.to_string()
}
