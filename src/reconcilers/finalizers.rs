// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for `NamespaceLabel` resources.
//!
//! The finalizer defers physical deletion of a `NamespaceLabel` until the labels it
//! applied have been removed from the namespace. It is attached in a pass of its own
//! before any namespace mutation, and released only after teardown succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use nslabel::labels::FINALIZER_NAMESPACE_LABEL;
//! use nslabel::reconcilers::finalizers::{ensure_finalizer, has_finalizer};
//!
//! if !has_finalizer(&resource, FINALIZER_NAMESPACE_LABEL) {
//!     ensure_finalizer(store, &resource, FINALIZER_NAMESPACE_LABEL).await?;
//!     return Ok(ReconcileOutcome::Done);
//! }
//! ```

use crate::crd::NamespaceLabel;
use crate::store::LabelStore;
use anyhow::Result;
use kube::ResourceExt;
use tracing::info;

/// Whether `finalizer` is present on the resource.
#[must_use]
pub fn has_finalizer(resource: &NamespaceLabel, finalizer: &str) -> bool {
    resource.finalizers().iter().any(|f| f == finalizer)
}

/// Add a finalizer to a resource if not already present.
///
/// # Returns
///
/// `true` if the finalizer was written, `false` if it was already there.
///
/// # Errors
///
/// Returns an error if the patch fails.
pub async fn ensure_finalizer(
    store: &dyn LabelStore,
    resource: &NamespaceLabel,
    finalizer: &str,
) -> Result<bool> {
    if has_finalizer(resource, finalizer) {
        return Ok(false);
    }

    info!(
        "Adding finalizer {} to {}/{} NamespaceLabel",
        finalizer,
        resource.namespace().unwrap_or_default(),
        resource.name_any()
    );

    let mut finalizers = resource.finalizers().to_vec();
    finalizers.push(finalizer.to_string());
    store.patch_finalizers(resource, finalizers).await?;
    Ok(true)
}

/// Remove a finalizer from a resource.
///
/// Idempotent: a missing finalizer is not an error.
///
/// # Errors
///
/// Returns an error if the patch fails. The finalizer then stays in place and
/// deletion remains blocked until a later pass succeeds.
pub async fn remove_finalizer(
    store: &dyn LabelStore,
    resource: &NamespaceLabel,
    finalizer: &str,
) -> Result<bool> {
    if !has_finalizer(resource, finalizer) {
        return Ok(false);
    }

    info!(
        "Removing finalizer {} from {}/{} NamespaceLabel",
        finalizer,
        resource.namespace().unwrap_or_default(),
        resource.name_any()
    );

    let finalizers: Vec<String> = resource
        .finalizers()
        .iter()
        .filter(|f| *f != finalizer)
        .cloned()
        .collect();
    store.patch_finalizers(resource, finalizers).await?;
    Ok(true)
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
