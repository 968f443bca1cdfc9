// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for manifest assembly with the embedded template set.
//!
//! Rendered manifests are parsed back as YAML and checked structurally:
//! container order, mounts, probes, env precedence, volume dedup, sizing and
//! the absent-versus-empty handling of init containers and host aliases.

mod common;

use common::*;
use fleetyard_core::application::SidecarResolver;
use fleetyard_core::domain::config_source::ConfigSource;
use fleetyard_core::domain::error::DeployError;
use fleetyard_core::domain::profile::Profile;
use fleetyard_core::domain::service::ServiceSettings;
use fleetyard_core::domain::sidecar::{ConfigMapVolumeMount, SecurityContext, SidecarConfig};
use fleetyard_core::domain::sizing::{ComponentSizing, CustomSizing};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_gate_end_to_end() {
    let store = Arc::new(RecordingSecretStore::default());
    let assembler = assembler(store.clone(), SidecarResolver::new());

    let text = assembler
        .assemble_deployment(&gate(), &details(), &gate_configuration())
        .unwrap();
    let deployment = parse(&text);
    let pod = pod_spec(&deployment);

    assert_eq!(container_names(pod), vec!["gate"]);
    let container = &pod["containers"][0];
    let mounts = container["volumeMounts"].as_sequence().unwrap();
    assert_eq!(mounts.len(), 1);
    assert_eq!(mounts[0]["mountPath"].as_str(), Some("/opt/spinnaker/config"));
    assert_eq!(mounts[0]["name"].as_str(), Some("gate-files-1"));

    let probe = &container["readinessProbe"]["exec"]["command"];
    assert_eq!(probe[0].as_str(), Some("wget"));
    assert_eq!(probe[4].as_str(), Some("http://localhost:8084/health"));
    assert!(container.get("lifecycle").is_none());
    assert!(container.get("resources").is_none());
    assert_eq!(container["ports"][0]["containerPort"].as_u64(), Some(8084));
    assert_eq!(
        container["image"].as_str(),
        Some("us-docker.pkg.dev/spinnaker-community/docker/gate:1.31.0")
    );

    assert_eq!(pod["volumes"][0]["secret"]["secretName"].as_str(), Some("gate-files-1"));
    assert!(pod.get("initContainers").is_none());
    assert!(pod.get("hostAliases").is_none());
    assert_eq!(pod["terminationGracePeriodSeconds"].as_u64(), Some(60));

    assert_eq!(deployment["kind"].as_str(), Some("Deployment"));
    assert_eq!(deployment["metadata"]["namespace"].as_str(), Some("spinnaker"));
    assert_eq!(deployment["spec"]["replicas"].as_u64(), Some(1));
    assert_eq!(
        deployment["metadata"]["labels"]["app.kubernetes.io/version"].as_str(),
        Some("1.31.0")
    );

    let calls = store.calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name_prefix, "gate-files");
    assert_eq!(calls[0].namespace, "spinnaker");
    assert_eq!(calls[0].files[0].source.to_str(), Some("/tmp/fleetyard-staging/prod/gate.yml"));
}

#[test]
fn test_tcp_probe_without_health_endpoint() {
    let mut resolved = gate_configuration();
    let mut settings = gate_settings();
    settings.health_endpoint = None;
    resolved.runtime_settings.insert("gate", settings);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(&assembler.assemble_deployment(&gate(), &details(), &resolved).unwrap());
    let container = &pod_spec(&deployment)["containers"][0];

    assert_eq!(container["readinessProbe"]["tcpSocket"]["port"].as_u64(), Some(8084));
    assert!(container["readinessProbe"].get("exec").is_none());
}

#[test]
fn test_settings_env_overrides_profile_env() {
    let mut resolved = gate_configuration();
    resolved.add_profile(
        "gate",
        Profile::new("gate.yml", "/opt/spinnaker/config/gate.yml")
            .with_env("SPRING_PROFILES_ACTIVE", "local")
            .with_env("FROM_PROFILE", "yes"),
    );
    let mut settings = gate_settings();
    settings.env.insert("SPRING_PROFILES_ACTIVE".to_string(), "prod".to_string());
    resolved.runtime_settings.insert("gate", settings);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(&assembler.assemble_deployment(&gate(), &details(), &resolved).unwrap());
    let container = &pod_spec(&deployment)["containers"][0];

    assert_eq!(env_value(container, "SPRING_PROFILES_ACTIVE"), Some("prod"));
    assert_eq!(env_value(container, "FROM_PROFILE"), Some("yes"));
}

#[test]
fn test_duplicate_volume_ids_render_once() {
    let mut resolved = gate_configuration();
    let mut settings = gate_settings();
    // Same id as the bundle the recording store hands out first.
    settings
        .kubernetes
        .volumes
        .push(ConfigSource::config_map("gate-files-1", "/elsewhere"));
    settings
        .kubernetes
        .volumes
        .push(ConfigSource::config_map("trust-bundle", "/etc/ssl/custom"));
    resolved.runtime_settings.insert("gate", settings);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(&assembler.assemble_deployment(&gate(), &details(), &resolved).unwrap());
    let pod = pod_spec(&deployment);

    let volumes = pod["volumes"].as_sequence().unwrap();
    assert_eq!(volumes.len(), 2);
    assert_eq!(volumes[0]["name"].as_str(), Some("gate-files-1"));
    assert!(volumes[0].get("secret").is_some());
    assert_eq!(volumes[1]["configMap"]["name"].as_str(), Some("trust-bundle"));
}

#[test]
fn test_container_order_and_custom_sidecars() {
    let mut resolved = gate_configuration();
    let mut gate_settings = gate_settings();
    gate_settings.monitored = true;
    resolved.runtime_settings.insert("gate", gate_settings);
    resolved.runtime_settings.insert("monitoring-daemon", ServiceSettings::new(8008));
    resolved.add_profile(
        "monitoring-daemon",
        Profile::new("registry/gate.yml", "/opt/spinnaker-monitoring/registry/gate.yml"),
    );

    let mut scratch = SidecarConfig::new("logshipper", "fluent/fluent-bit:2.2");
    scratch.mount_path = Some("/var/log/gate".to_string());
    let mut proxy = SidecarConfig::new("proxy", "envoyproxy/envoy:v1.29");
    proxy.args = vec!["-c".to_string(), "/etc/envoy/envoy.yaml".to_string()];
    proxy.security_context = Some(SecurityContext { privileged: true });
    proxy.config_map_volume_mounts.push(ConfigMapVolumeMount {
        config_map_name: "envoy-config".to_string(),
        mount_path: "/etc/envoy".to_string(),
    });

    let mut details = details();
    details
        .configuration
        .environment
        .sidecars
        .insert("gate".to_string(), vec![scratch, proxy]);

    let assembler = assembler(
        Arc::new(RecordingSecretStore::default()),
        SidecarResolver::new().with_monitoring(monitoring_daemon()),
    );
    let deployment = parse(&assembler.assemble_deployment(&gate(), &details, &resolved).unwrap());
    let pod = pod_spec(&deployment);

    assert_eq!(
        container_names(pod),
        vec!["gate", "monitoring-daemon", "logshipper", "proxy"]
    );

    let daemon = &pod["containers"][1];
    assert_eq!(daemon["ports"][0]["containerPort"].as_u64(), Some(8008));
    assert_eq!(daemon["readinessProbe"]["tcpSocket"]["port"].as_u64(), Some(8008));

    let proxy = &pod["containers"][3];
    assert!(proxy.get("readinessProbe").is_none());
    assert!(proxy.get("ports").is_none());
    assert!(proxy.get("resources").is_none());
    assert_eq!(proxy["securityContext"]["privileged"].as_bool(), Some(true));
    assert_eq!(proxy["args"][1].as_str(), Some("/etc/envoy/envoy.yaml"));

    // The primary container shares the logshipper scratch space.
    let primary_mounts: Vec<_> = pod["containers"][0]["volumeMounts"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(|m| m["mountPath"].as_str())
        .collect();
    assert!(primary_mounts.contains(&"/var/log/gate"));
    assert!(primary_mounts.contains(&"/opt/spinnaker-monitoring/registry"));

    let volumes = pod["volumes"].as_sequence().unwrap();
    let scratch = volumes.iter().find(|v| v["name"].as_str() == Some("logshipper")).unwrap();
    assert!(scratch.get("emptyDir").is_some());
    let config_map = volumes.iter().find(|v| v["name"].as_str() == Some("envoy-config")).unwrap();
    assert_eq!(config_map["configMap"]["name"].as_str(), Some("envoy-config"));
    assert!(volumes.iter().all(|v| v["name"].as_str() != Some("proxy")));
    assert!(dangling_mounts(pod).is_empty());
}

#[test]
fn test_sidecar_scratch_mount_with_config_maps_has_a_volume() {
    let mut proxy = SidecarConfig::new("proxy", "envoyproxy/envoy:v1.29");
    proxy.mount_path = Some("/var/run/envoy".to_string());
    proxy.config_map_volume_mounts.push(ConfigMapVolumeMount {
        config_map_name: "envoy-config".to_string(),
        mount_path: "/etc/envoy".to_string(),
    });

    let mut details = details();
    details
        .configuration
        .environment
        .sidecars
        .insert("gate".to_string(), vec![proxy]);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(
        &assembler
            .assemble_deployment(&gate(), &details, &gate_configuration())
            .unwrap(),
    );
    let pod = pod_spec(&deployment);

    assert_eq!(dangling_mounts(pod), Vec::<(String, String)>::new());

    let volumes = pod["volumes"].as_sequence().unwrap();
    let scratch = volumes.iter().find(|v| v["name"].as_str() == Some("proxy")).unwrap();
    assert!(scratch.get("emptyDir").is_some());
    assert_eq!(
        volumes.iter().filter(|v| v["name"].as_str() == Some("proxy")).count(),
        1
    );
}

#[test]
fn test_missing_monitoring_profile_aborts_assembly() {
    let mut resolved = gate_configuration();
    let mut settings = gate_settings();
    settings.monitored = true;
    resolved.runtime_settings.insert("gate", settings);
    resolved.runtime_settings.insert("monitoring-daemon", ServiceSettings::new(8008));

    let store = Arc::new(RecordingSecretStore::default());
    let assembler = assembler(
        store.clone(),
        SidecarResolver::new().with_monitoring(monitoring_daemon()),
    );
    let err = assembler.assemble_deployment(&gate(), &details(), &resolved).unwrap_err();

    match err {
        DeployError::SidecarProfileMissing { sidecar, service, profile } => {
            assert_eq!(sidecar, "monitoring-daemon");
            assert_eq!(service, "gate");
            assert_eq!(profile, "registry/gate.yml");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(store.calls.lock().is_empty());
}

#[test]
fn test_init_containers_and_host_aliases() {
    let mut details = details();
    let environment = &mut details.configuration.environment;
    environment.init_containers.insert(
        "gate".to_string(),
        vec![json!({
            "name": "wait-for-redis",
            "image": "busybox:1.36",
            "command": ["sh", "-c", "until nc -z redis 6379; do sleep 1; done"]
        })],
    );
    environment.host_aliases.insert("gate".to_string(), vec![]);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(
        &assembler
            .assemble_deployment(&gate(), &details, &gate_configuration())
            .unwrap(),
    );
    let pod = pod_spec(&deployment);

    assert_eq!(pod["initContainers"][0]["name"].as_str(), Some("wait-for-redis"));
    assert_eq!(
        pod["initContainers"][0]["command"][2].as_str(),
        Some("until nc -z redis 6379; do sleep 1; done")
    );
    // An empty list is treated as undeclared.
    assert!(pod.get("hostAliases").is_none());
}

#[test]
fn test_custom_sizing_and_replicas() {
    let mut sizing = CustomSizing::new();
    sizing.insert(
        "gate",
        ComponentSizing {
            requests: [("cpu".to_string(), json!("500m")), ("memory".to_string(), json!("1Gi"))]
                .into_iter()
                .collect(),
            limits: [("memory".to_string(), json!("2Gi"))].into_iter().collect(),
            replicas: Some(3),
        },
    );
    let mut details = details();
    details.configuration.environment.custom_sizing = Some(sizing);

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(
        &assembler
            .assemble_deployment(&gate(), &details, &gate_configuration())
            .unwrap(),
    );
    let container = &pod_spec(&deployment)["containers"][0];

    assert_eq!(deployment["spec"]["replicas"].as_u64(), Some(3));
    assert_eq!(container["resources"]["requests"]["cpu"].as_str(), Some("500m"));
    assert_eq!(container["resources"]["limits"]["memory"].as_str(), Some("2Gi"));
}

#[test]
fn test_pre_stop_hook_and_pod_extras() {
    let service = gate().with_pre_stop();
    let mut resolved = gate_configuration();
    let mut settings = gate_settings();
    settings.kubernetes.image_pull_secrets = vec!["regcred".to_string()];
    settings
        .kubernetes
        .pod_annotations
        .insert("prometheus.io/scrape".to_string(), "true".to_string());
    resolved.runtime_settings.insert("gate", settings);

    let mut details = details();
    details.configuration.version = "--1.31.0+build/7--".to_string();

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(&assembler.assemble_deployment(&service, &details, &resolved).unwrap());
    let pod = pod_spec(&deployment);

    let command = &pod["containers"][0]["lifecycle"]["preStop"]["exec"]["command"];
    assert_eq!(command[0].as_str(), Some("bash"));
    assert_eq!(command[1].as_str(), Some("/opt/spinnaker/scripts/shutdown.sh"));
    assert_eq!(pod["imagePullSecrets"][0]["name"].as_str(), Some("regcred"));
    assert_eq!(
        deployment["spec"]["template"]["metadata"]["annotations"]["prometheus.io/scrape"].as_str(),
        Some("true")
    );
    assert_eq!(
        deployment["metadata"]["labels"]["app.kubernetes.io/version"].as_str(),
        Some("1.31.0build7")
    );
}

#[test]
fn test_unusable_version_falls_back_to_unknown() {
    let mut details = details();
    details.configuration.version = "!!!".to_string();

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deployment = parse(
        &assembler
            .assemble_deployment(&gate(), &details, &gate_configuration())
            .unwrap(),
    );
    assert_eq!(
        deployment["spec"]["template"]["metadata"]["labels"]["app.kubernetes.io/version"].as_str(),
        Some("unknown")
    );
}

#[test]
fn test_namespace_and_service_manifests() {
    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let resolved = gate_configuration();

    let namespace = parse(&assembler.assemble_namespace(&gate(), &resolved).unwrap());
    assert_eq!(namespace["kind"].as_str(), Some("Namespace"));
    assert_eq!(namespace["metadata"]["name"].as_str(), Some("spinnaker"));

    let service = parse(&assembler.assemble_service(&gate(), &resolved).unwrap());
    assert_eq!(service["kind"].as_str(), Some("Service"));
    assert_eq!(service["spec"]["selector"]["cluster"].as_str(), Some("gate"));
    assert_eq!(service["spec"]["ports"][0]["port"].as_u64(), Some(8084));
    assert_eq!(service["spec"]["ports"][0]["targetPort"].as_u64(), Some(8084));
}

#[test]
fn test_assemble_all_skips_disabled_services() {
    let mut resolved = gate_configuration();
    let mut deck = ServiceSettings::new(9000);
    deck.enabled = false;
    resolved.runtime_settings.insert("deck", deck);
    let services = vec![
        fleetyard_core::domain::service::ServiceDescriptor::new("deck", "deck", "deck"),
        gate(),
    ];

    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let manifests = assembler.assemble_all(&services, &details(), &resolved).unwrap();

    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].service, "gate");
    assert_eq!(manifests[0].namespace, "spinnaker");

    let documents: Vec<serde_yaml::Value> = manifests[0]
        .to_yaml_stream()
        .split("\n---\n")
        .map(|doc| parse(doc.trim_start_matches("---\n")))
        .collect();
    let kinds: Vec<_> = documents.iter().filter_map(|d| d["kind"].as_str()).collect();
    assert_eq!(kinds, vec!["Namespace", "Service", "Deployment"]);
}

#[test]
fn test_missing_settings_is_reported() {
    let assembler = assembler(Arc::new(RecordingSecretStore::default()), SidecarResolver::new());
    let deck = fleetyard_core::domain::service::ServiceDescriptor::new("deck", "deck", "deck");
    let err = assembler
        .assemble_deployment(&deck, &details(), &gate_configuration())
        .unwrap_err();
    assert!(matches!(err, DeployError::MissingServiceSettings(name) if name == "deck"));
}
