// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Persistence of the applied label snapshot.
//!
//! The operator must remember exactly which labels it wrote so that it can later
//! remove them without touching anything it does not own. Two interchangeable
//! locations are supported:
//!
//! - [`SnapshotStore::Status`] - `status.appliedLabels` on the `NamespaceLabel`.
//! - [`SnapshotStore::Annotation`] - a JSON annotation on the namespace itself, kept in
//!   addition to the status copy, so that teardown still works when the resource
//!   status has been lost.
//!
//! Both strategies only mutate in-memory objects; the reconciler persists them with
//! its regular namespace and status writes.

use crate::crd::{LabelMap, NamespaceLabel, NamespaceLabelStatus};
use crate::errors::SyncError;
use crate::labels::APPLIED_LABELS_ANNOTATION;
use clap::ValueEnum;
use k8s_openapi::api::core::v1::Namespace;
use tracing::warn;

/// Where the applied label snapshot is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SnapshotStore {
    /// `status.appliedLabels` on the resource
    #[default]
    Status,
    /// `labels.shahaf.com/applied` annotation on the namespace (plus the status copy)
    Annotation,
}

impl SnapshotStore {
    /// Load the labels the operator last applied to `namespace`.
    #[must_use]
    pub fn load_applied_snapshot(
        self,
        resource: &NamespaceLabel,
        namespace: Option<&Namespace>,
    ) -> LabelMap {
        let from_status = || {
            resource
                .status
                .as_ref()
                .map(|s| s.applied_labels.clone())
                .unwrap_or_default()
        };

        match self {
            Self::Status => from_status(),
            Self::Annotation => namespace
                .and_then(read_applied_annotation)
                .unwrap_or_else(from_status),
        }
    }

    /// Record `applied` as the new snapshot.
    ///
    /// An empty `applied` clears the snapshot, removing the annotation altogether.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Serialization`] if the annotation value cannot be encoded.
    pub fn store_applied_snapshot(
        self,
        status: &mut NamespaceLabelStatus,
        namespace: Option<&mut Namespace>,
        applied: &LabelMap,
    ) -> Result<(), SyncError> {
        status.applied_labels = applied.clone();

        if self == Self::Annotation {
            if let Some(namespace) = namespace {
                write_applied_annotation(namespace, applied)?;
            }
        }

        Ok(())
    }
}

/// Read the snapshot annotation, if present and well-formed.
fn read_applied_annotation(namespace: &Namespace) -> Option<LabelMap> {
    let raw = namespace
        .metadata
        .annotations
        .as_ref()?
        .get(APPLIED_LABELS_ANNOTATION)?;

    if raw.is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(applied) => Some(applied),
        Err(e) => {
            warn!(
                namespace = ?namespace.metadata.name,
                error = %e,
                "Ignoring unparsable applied-labels annotation"
            );
            None
        }
    }
}

fn write_applied_annotation(namespace: &mut Namespace, applied: &LabelMap) -> Result<(), SyncError> {
    if applied.is_empty() {
        if let Some(annotations) = namespace.metadata.annotations.as_mut() {
            annotations.remove(APPLIED_LABELS_ANNOTATION);
        }
        return Ok(());
    }

    let encoded = serde_json::to_string(applied)?;
    namespace
        .metadata
        .annotations
        .get_or_insert_with(Default::default)
        .insert(APPLIED_LABELS_ANNOTATION.to_string(), encoded);
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod snapshot_tests;
