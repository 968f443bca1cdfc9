// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Fleetyard Core
//!
//! Deterministic assembly of Kubernetes manifests (namespace, service,
//! deployment) for the services of one deployment, plus the secret bundles
//! those manifests mount.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Stage configuration, build containers, render manifests

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
