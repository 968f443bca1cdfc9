// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Template rendering contract.
//!
//! The engine describes every manifest fragment as a named template plus a
//! set of bindings. Bindings holding previously rendered text are inlined
//! verbatim; list bindings render as repeated blocks; an unbound optional
//! binding omits its section entirely, which is distinct from binding an
//! empty list.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// The template set manifests are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestTemplate {
    Namespace,
    Service,
    Deployment,
    PodSpec,
    Container,
    Port,
    VolumeMount,
    SecretVolume,
    EmptyDirVolume,
    ConfigMapVolume,
    ExecReadinessProbe,
    TcpSocketReadinessProbe,
    Lifecycle,
    Resources,
    SecurityContext,
}

impl ManifestTemplate {
    pub const ALL: [ManifestTemplate; 15] = [
        ManifestTemplate::Namespace,
        ManifestTemplate::Service,
        ManifestTemplate::Deployment,
        ManifestTemplate::PodSpec,
        ManifestTemplate::Container,
        ManifestTemplate::Port,
        ManifestTemplate::VolumeMount,
        ManifestTemplate::SecretVolume,
        ManifestTemplate::EmptyDirVolume,
        ManifestTemplate::ConfigMapVolume,
        ManifestTemplate::ExecReadinessProbe,
        ManifestTemplate::TcpSocketReadinessProbe,
        ManifestTemplate::Lifecycle,
        ManifestTemplate::Resources,
        ManifestTemplate::SecurityContext,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestTemplate::Namespace => "namespace.yml",
            ManifestTemplate::Service => "service.yml",
            ManifestTemplate::Deployment => "deployment.yml",
            ManifestTemplate::PodSpec => "podSpec.yml",
            ManifestTemplate::Container => "container.yml",
            ManifestTemplate::Port => "port.yml",
            ManifestTemplate::VolumeMount => "volumeMount.yml",
            ManifestTemplate::SecretVolume => "secretVolume.yml",
            ManifestTemplate::EmptyDirVolume => "emptyDirVolume.yml",
            ManifestTemplate::ConfigMapVolume => "configMapVolume.yml",
            ManifestTemplate::ExecReadinessProbe => "execReadinessProbe.yml",
            ManifestTemplate::TcpSocketReadinessProbe => "tcpSocketReadinessProbe.yml",
            ManifestTemplate::Lifecycle => "lifecycle.yml",
            ManifestTemplate::Resources => "resources.yml",
            ManifestTemplate::SecurityContext => "securityContext.yml",
        }
    }
}

impl fmt::Display for ManifestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Key/value bindings for one template render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateBindings {
    values: Map<String, Value>,
}

impl TemplateBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value. Rendered text is bound like any other string.
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Bind a value only when present; `None` leaves the key absent.
    pub fn bind_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.bind(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Failed to render template {template}: {reason}")]
    RenderFailed { template: String, reason: String },
}

/// Turns a named template plus bindings into manifest text.
pub trait TemplateRenderer: Send + Sync {
    fn render(
        &self,
        template: ManifestTemplate,
        bindings: &TemplateBindings,
    ) -> Result<String, RenderError>;
}
