// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod address;
pub mod config_stager;
pub mod container_builder;
pub mod manifest_assembler;
pub mod pod_spec_renderer;
pub mod service_settings;
pub mod sidecar_resolver;

// Re-export the engine entry points for convenience
pub use address::{build_address, ConnectCommandBuilder};
pub use manifest_assembler::{enabled_services, ManifestAssembler, ServiceManifests};
pub use service_settings::ServiceSettingsBuilder;
pub use sidecar_resolver::SidecarResolver;
