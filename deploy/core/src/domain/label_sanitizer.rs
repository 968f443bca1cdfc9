// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Label Sanitizer Domain Service
//!
//! Turns arbitrary strings (typically deployment version strings) into values
//! Kubernetes accepts as label values.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements label value sanitization

/// Value substituted when sanitization leaves nothing behind.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Label sanitizer domain service
///
/// A sanitized value only contains `[A-Za-z0-9-_.]` and never starts or ends
/// with `-`, `_` or `.`. Sanitization is total and idempotent.
pub struct LabelSanitizer;

impl LabelSanitizer {
    /// Strip disallowed characters, then trim non-alphanumeric characters
    /// from both ends.
    ///
    /// # Examples
    /// ```
    /// use fleetyard_core::domain::label_sanitizer::LabelSanitizer;
    ///
    /// assert_eq!(LabelSanitizer::sanitize("v1.2.3!!"), "v1.2.3");
    /// assert_eq!(LabelSanitizer::sanitize("--1.0--"), "1.0");
    /// assert_eq!(LabelSanitizer::sanitize("___"), "");
    /// ```
    pub fn sanitize(value: &str) -> String {
        let allowed: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();

        allowed
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_string()
    }

    /// Sanitize a version string for use as the `app.kubernetes.io/version`
    /// label, falling back to [`UNKNOWN_LABEL`].
    pub fn version_label(version: &str) -> String {
        let label = Self::sanitize(version);
        if label.is_empty() {
            tracing::debug!(
                version = %version,
                "Version sanitized to empty label, using '{}'",
                UNKNOWN_LABEL
            );
            UNKNOWN_LABEL.to_string()
        } else {
            label
        }
    }
}
