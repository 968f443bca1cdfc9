// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `fleetyard render` - assemble manifests for one or every service.
//!
//! Services are assembled concurrently on the blocking pool; the output is
//! written in declaration order regardless of completion order.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use fleetyard_core::application::{enabled_services, ManifestAssembler, ServiceManifests};
use fleetyard_core::infrastructure::{HandlebarsTemplateRenderer, ManifestSecretStore, StagedSecret};

use super::load_deployment;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Render a single service by canonical name (rendered even when disabled)
    #[arg(short, long, value_name = "NAME")]
    pub service: Option<String>,

    /// Write `<service>.yml` and `<service>-secrets.yml` into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory of template overrides, matched by file name
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

pub async fn execute(args: RenderArgs, config: Option<PathBuf>) -> Result<()> {
    let (_, deployment) = load_deployment(config)?;

    let renderer = match &args.templates {
        Some(dir) => HandlebarsTemplateRenderer::with_overrides(dir),
        None => HandlebarsTemplateRenderer::new(),
    }
    .context("Failed to load manifest templates")?;

    let store = Arc::new(ManifestSecretStore::new());
    let assembler = Arc::new(ManifestAssembler::new(
        Arc::new(renderer),
        store.clone(),
        deployment.sidecar_resolver(),
    ));

    let services = match &args.service {
        Some(name) => vec![deployment
            .service(name)
            .cloned()
            .ok_or_else(|| anyhow!("Service '{}' is not declared in the deployment file", name))?],
        None => enabled_services(&deployment.services, &deployment.resolved)?
            .into_iter()
            .cloned()
            .collect(),
    };

    let details = Arc::new(deployment.details);
    let resolved = Arc::new(deployment.resolved);

    let mut handles = Vec::with_capacity(services.len());
    for service in services {
        let assembler = assembler.clone();
        let details = details.clone();
        let resolved = resolved.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            assembler.assemble(&service, &details, &resolved)
        }));
    }

    let mut manifests = Vec::with_capacity(handles.len());
    for handle in handles {
        let assembled = handle.await.context("Assembly task panicked")??;
        manifests.push(assembled);
    }

    match &args.output {
        Some(dir) => {
            let written = write_manifests(dir, &manifests, &store.bundles())?;
            for path in written {
                println!("{} {}", "✓ Wrote".green(), path.display());
            }
        }
        None => {
            for manifest in &manifests {
                print!("{}", manifest.to_yaml_stream());
                for bundle in store.bundles_for(&manifest.service) {
                    print!("---\n{}", bundle.manifest);
                }
            }
        }
    }

    info!(services = manifests.len(), "Rendered manifests");
    Ok(())
}

/// Write each service's manifests and its secret bundles into `dir`.
///
/// Returns the written paths in write order. Services without bundles get no
/// secrets file.
pub fn write_manifests(
    dir: &Path,
    manifests: &[ServiceManifests],
    bundles: &[StagedSecret],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for manifest in manifests {
        let path = dir.join(format!("{}.yml", manifest.service));
        std::fs::write(&path, manifest.to_yaml_stream())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);

        let secrets: String = bundles
            .iter()
            .filter(|b| b.service == manifest.service)
            .map(|b| format!("---\n{}", b.manifest))
            .collect();
        if secrets.is_empty() {
            continue;
        }
        let path = dir.join(format!("{}-secrets.yml", manifest.service));
        std::fs::write(&path, secrets)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifests(service: &str) -> ServiceManifests {
        ServiceManifests {
            service: service.to_string(),
            namespace: "spinnaker".to_string(),
            namespace_yaml: "kind: Namespace".to_string(),
            service_yaml: "kind: Service".to_string(),
            deployment_yaml: "kind: Deployment".to_string(),
        }
    }

    fn bundle(service: &str, name: &str) -> StagedSecret {
        StagedSecret {
            name: name.to_string(),
            namespace: "spinnaker".to_string(),
            service: service.to_string(),
            files: vec!["gate.yml".to_string()],
            manifest: format!("kind: Secret\nmetadata:\n  name: {name}\n"),
        }
    }

    #[test]
    fn test_write_manifests_and_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let written = write_manifests(
            &out,
            &[manifests("spin-gate"), manifests("spin-deck")],
            &[
                bundle("spin-gate", "spin-gate-files-a"),
                bundle("spin-gate", "spin-gate-files-b"),
            ],
        )
        .unwrap();

        assert_eq!(
            written,
            vec![
                out.join("spin-gate.yml"),
                out.join("spin-gate-secrets.yml"),
                out.join("spin-deck.yml"),
            ]
        );

        let gate = std::fs::read_to_string(out.join("spin-gate.yml")).unwrap();
        assert_eq!(gate, "---\nkind: Namespace\n---\nkind: Service\n---\nkind: Deployment\n");

        let secrets = std::fs::read_to_string(out.join("spin-gate-secrets.yml")).unwrap();
        assert_eq!(secrets.matches("kind: Secret").count(), 2);
        assert!(secrets.contains("name: spin-gate-files-b"));
        assert!(!out.join("spin-deck-secrets.yml").exists());
    }

    #[test]
    fn test_write_manifests_empty() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_manifests(dir.path(), &[], &[]).unwrap();
        assert!(written.is_empty());
    }
}
