// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for namespace label synchronization.
//!
//! Transient I/O failures (API server unavailable, write conflicts) travel as plain
//! [`anyhow::Error`]s wrapping [`kube::Error`] and are retried with the standard
//! controller backoff. The types here cover the conditions that need to be told
//! apart from those:
//!
//! - [`ProtectionError`] - a desired label collides with a protected namespace label
//!   while protection runs in `fail` mode. Persisted as a failing `Ready` condition and
//!   retried after a fixed delay.
//! - [`SyncError`] - structural problems with the objects being reconciled.
//!
//! Malformed protection patterns and unknown protection modes are deliberately absent:
//! neither is ever an error.

use thiserror::Error;

/// A desired label cannot be written because it would overwrite a protected value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    /// The namespace already carries `key` with a different value than the one desired.
    #[error("protected label '{key}' cannot be modified (existing: '{existing}', attempted: '{attempted}')")]
    Conflict {
        /// The protected label key
        key: String,
        /// Value currently on the namespace
        existing: String,
        /// Value requested by the `NamespaceLabel` spec
        attempted: String,
    },
}

impl ProtectionError {
    /// The label key that triggered the error.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Conflict { key, .. } => key,
        }
    }
}

/// Errors raised while synchronizing a `NamespaceLabel` onto its namespace.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The namespace containing the resource does not exist during an active sync.
    ///
    /// During teardown the same situation counts as completed cleanup instead.
    #[error("target namespace '{0}' not found")]
    NamespaceNotFound(String),

    /// The resource carries no `metadata.namespace`.
    #[error("NamespaceLabel '{0}' has no namespace")]
    MissingNamespace(String),

    /// The applied label snapshot could not be serialized.
    #[error("failed to serialize applied label snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Metric category for a failed reconciliation.
///
/// One of `protection_error`, `namespace_not_found` or `api_error`. Anything that
/// is not a protection conflict or a missing target namespace counts as an API error.
#[must_use]
pub fn error_category(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ProtectionError>().is_some() {
        "protection_error"
    } else if matches!(err.downcast_ref::<SyncError>(), Some(SyncError::NamespaceNotFound(_))) {
        "namespace_not_found"
    } else {
        "api_error"
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
