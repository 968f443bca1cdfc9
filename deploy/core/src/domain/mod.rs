// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model for manifest assembly.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value types, error taxonomy and collaborator traits

pub mod artifact;
pub mod cluster;
pub mod config_source;
pub mod container;
pub mod deployment;
pub mod error;
pub mod label_sanitizer;
pub mod profile;
pub mod secret_store;
pub mod service;
pub mod sidecar;
pub mod sizing;
pub mod template;
