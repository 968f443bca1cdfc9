// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Handlebars Template Renderer
//!
//! [`TemplateRenderer`] backed by Handlebars and the embedded Kubernetes
//! template set.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Turn named templates plus bindings into manifest text
//! - **Integration:** ManifestAssembler / PodSpecRenderer → Handlebars
//!
//! # Template Conventions
//!
//! - `{{json x}}` - `x` as a JSON literal (quoted strings, lists, maps)
//! - `{{{x}}}` - previously rendered text, inlined as-is
//! - `{{#if (defined x)}}` - section present only when `x` is bound, so an
//!   unbound list differs from an empty one
//!
//! Escaping is disabled: output is YAML, not HTML.

use handlebars::{handlebars_helper, no_escape, Handlebars};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::template::{ManifestTemplate, RenderError, TemplateBindings, TemplateRenderer};

handlebars_helper!(to_json: |v: Json| v.to_string());
handlebars_helper!(is_defined: |v: Json| !v.is_null());

/// Source of one embedded template.
pub fn embedded_template(template: ManifestTemplate) -> &'static str {
    match template {
        ManifestTemplate::Namespace => include_str!("../../templates/kubernetes/namespace.yml"),
        ManifestTemplate::Service => include_str!("../../templates/kubernetes/service.yml"),
        ManifestTemplate::Deployment => include_str!("../../templates/kubernetes/deployment.yml"),
        ManifestTemplate::PodSpec => include_str!("../../templates/kubernetes/podSpec.yml"),
        ManifestTemplate::Container => include_str!("../../templates/kubernetes/container.yml"),
        ManifestTemplate::Port => include_str!("../../templates/kubernetes/port.yml"),
        ManifestTemplate::VolumeMount => include_str!("../../templates/kubernetes/volumeMount.yml"),
        ManifestTemplate::SecretVolume => {
            include_str!("../../templates/kubernetes/secretVolume.yml")
        }
        ManifestTemplate::EmptyDirVolume => {
            include_str!("../../templates/kubernetes/emptyDirVolume.yml")
        }
        ManifestTemplate::ConfigMapVolume => {
            include_str!("../../templates/kubernetes/configMapVolume.yml")
        }
        ManifestTemplate::ExecReadinessProbe => {
            include_str!("../../templates/kubernetes/execReadinessProbe.yml")
        }
        ManifestTemplate::TcpSocketReadinessProbe => {
            include_str!("../../templates/kubernetes/tcpSocketReadinessProbe.yml")
        }
        ManifestTemplate::Lifecycle => include_str!("../../templates/kubernetes/lifecycle.yml"),
        ManifestTemplate::Resources => include_str!("../../templates/kubernetes/resources.yml"),
        ManifestTemplate::SecurityContext => {
            include_str!("../../templates/kubernetes/securityContext.yml")
        }
    }
}

pub struct HandlebarsTemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsTemplateRenderer {
    /// Renderer over the embedded template set.
    pub fn new() -> Result<Self, RenderError> {
        let mut renderer = Self {
            handlebars: Self::engine(),
        };
        for template in ManifestTemplate::ALL {
            renderer.register(template, embedded_template(template))?;
        }
        Ok(renderer)
    }

    /// Renderer over the embedded set, with any `<file_name>` found in
    /// `dir` replacing the embedded template of the same name.
    pub fn with_overrides(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let mut renderer = Self::new()?;
        for template in ManifestTemplate::ALL {
            let path = dir.join(template.file_name());
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| RenderError::InvalidTemplate {
                template: template.to_string(),
                reason: format!("failed to read {:?}: {}", path, e),
            })?;
            renderer.register(template, &source)?;
            info!(template = %template, path = ?path, "Loaded template override");
        }
        Ok(renderer)
    }

    fn engine() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);
        handlebars.register_helper("json", Box::new(to_json));
        handlebars.register_helper("defined", Box::new(is_defined));
        handlebars
    }

    fn register(&mut self, template: ManifestTemplate, source: &str) -> Result<(), RenderError> {
        self.handlebars
            .register_template_string(template.file_name(), source.trim_end())
            .map_err(|e| RenderError::InvalidTemplate {
                template: template.to_string(),
                reason: e.to_string(),
            })
    }
}

impl TemplateRenderer for HandlebarsTemplateRenderer {
    fn render(
        &self,
        template: ManifestTemplate,
        bindings: &TemplateBindings,
    ) -> Result<String, RenderError> {
        let name = template.file_name();
        if !self.handlebars.has_template(name) {
            return Err(RenderError::UnknownTemplate(name.to_string()));
        }
        debug!(template = %name, bindings = bindings.as_map().len(), "Rendering template");
        self.handlebars
            .render(name, bindings.as_map())
            .map_err(|e| RenderError::RenderFailed {
                template: name.to_string(),
                reason: e.to_string(),
            })
    }
}
