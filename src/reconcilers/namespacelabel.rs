// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NamespaceLabel` reconciliation logic.
//!
//! Every pass reloads the resource and derives an explicit [`LifecycleState`]:
//!
//! ```text
//! Absent -> New -> Active -> Terminating -> Absent
//! ```
//!
//! - **New**: the finalizer is attached and the pass ends. The resulting update
//!   event triggers the first real sync, so the finalizer is durably recorded
//!   before the namespace is ever touched.
//! - **Active**: desired labels are filtered through the protection rules,
//!   applied to the namespace, stale ones removed, and the outcome reported.
//! - **Terminating**: every label this operator applied is removed and the
//!   finalizer released.

use crate::constants::{KIND_NAMESPACE_LABEL, TEARDOWN_RETRY_REQUEUE_SECS};
use crate::context::Context;
use crate::crd::{LabelMap, NamespaceLabel};
use crate::errors::{ProtectionError, SyncError};
use crate::labels::FINALIZER_NAMESPACE_LABEL;
use crate::metrics;
use crate::protection::{filter_protected_labels, FilterOutcome, ProtectionMode};
use crate::reconcilers::drift::drifted_keys;
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::label_set::{apply_desired, remove_stale};
use crate::reconcilers::status::{status_needs_update, update_status, SyncReport};
use crate::status_reasons::{
    DRIFT_EVENT_NOTE, EVENT_REASON_DRIFT_DETECTED, EVENT_REASON_PROTECTED_LABEL_SKIPPED,
    EVENT_REASON_PROTECTION_ERROR,
};
use crate::store::EventRecord;
use anyhow::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a `NamespaceLabel` is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// The resource does not exist (already deleted).
    Absent,
    /// The resource exists but does not carry the finalizer yet.
    New,
    /// The finalizer is in place; labels are kept in sync.
    Active,
    /// Deletion was requested.
    Terminating,
}

impl LifecycleState {
    /// Derive the lifecycle state of a freshly loaded resource.
    #[must_use]
    pub fn of(resource: Option<&NamespaceLabel>) -> Self {
        match resource {
            None => Self::Absent,
            Some(r) if r.metadata.deletion_timestamp.is_some() => Self::Terminating,
            Some(r) if has_finalizer(r, FINALIZER_NAMESPACE_LABEL) => Self::Active,
            Some(_) => Self::New,
        }
    }
}

/// What the controller should do after a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing more to do until the next watch event.
    Done,
    /// Try again after the given delay.
    RequeueAfter(Duration),
}

/// Reconcile the `NamespaceLabel` `name` in `namespace`.
///
/// # Errors
///
/// Returns an error when an API call fails, when the target namespace is missing
/// during an active sync, or when a fail-mode protection conflict blocks the pass
/// (a [`ProtectionError`] that can be recovered with `downcast_ref`).
pub async fn reconcile_namespacelabel(
    ctx: &Context,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome> {
    let resource = ctx.store.get_namespace_label(namespace, name).await?;
    let state = LifecycleState::of(resource.as_ref());

    debug!(namespace = %namespace, name = %name, state = ?state, "Reconciling NamespaceLabel");

    match (state, resource) {
        (LifecycleState::Absent, _) | (_, None) => {
            debug!(namespace = %namespace, name = %name, "NamespaceLabel not found, nothing to do");
            Ok(ReconcileOutcome::Done)
        }
        (LifecycleState::New, Some(resource)) => {
            ensure_finalizer(ctx.store.as_ref(), &resource, FINALIZER_NAMESPACE_LABEL).await?;
            Ok(ReconcileOutcome::Done)
        }
        (LifecycleState::Active, Some(resource)) => sync_labels(ctx, &resource).await,
        (LifecycleState::Terminating, Some(resource)) => teardown(ctx, &resource).await,
    }
}

fn target_namespace(resource: &NamespaceLabel) -> Result<String, SyncError> {
    resource
        .namespace()
        .ok_or_else(|| SyncError::MissingNamespace(resource.name_any()))
}

/// The Active transition: bring the namespace labels in line with `spec.labels`.
async fn sync_labels(ctx: &Context, resource: &NamespaceLabel) -> Result<ReconcileOutcome> {
    let target = target_namespace(resource)?;
    let Some(live_namespace) = ctx.store.get_namespace(&target).await? else {
        return Err(SyncError::NamespaceNotFound(target).into());
    };

    let protection = ctx.load_protection_config().await?;
    let desired = &resource.spec.labels;
    let live = live_namespace.metadata.labels.clone().unwrap_or_default();
    let prev_applied = ctx
        .snapshot_store
        .load_applied_snapshot(resource, Some(&live_namespace));

    let filtered = match filter_protected_labels(desired, &live, &protection) {
        Ok(filtered) => filtered,
        Err(e) => return Err(protection_failure(ctx, resource, &target, e).await),
    };

    let drifted = drifted_keys(&live, &prev_applied, &filtered.allowed);

    let mut updated_namespace = live_namespace.clone();
    let mut labels = live.clone();
    let labels_changed = remove_stale(&mut labels, desired, &prev_applied)
        | apply_desired(&mut labels, &filtered.allowed);
    if labels_changed {
        updated_namespace.metadata.labels = Some(labels.clone());
    }

    let applied = owned_labels(&filtered, &prev_applied, &labels);
    let mut status = resource.status.clone().unwrap_or_default();
    ctx.snapshot_store
        .store_applied_snapshot(&mut status, Some(&mut updated_namespace), &applied)?;

    if namespace_changed(&live_namespace, &updated_namespace) {
        ctx.store.replace_namespace(&updated_namespace).await?;
        info!(
            namespace = %target,
            labels = filtered.allowed.len(),
            "Synchronized namespace labels"
        );
    }

    if !drifted.is_empty() {
        warn!(namespace = %target, drifted = ?drifted, "{}", DRIFT_EVENT_NOTE);
        metrics::record_drift_detected(&target);
        publish(ctx, resource, EventRecord::warning(EVENT_REASON_DRIFT_DETECTED, DRIFT_EVENT_NOTE)).await;
    }

    if !filtered.skipped.is_empty() {
        info!(namespace = %target, skipped = ?filtered.skipped, mode = %protection.mode, "Skipped protected labels");
        metrics::record_protected_labels_skipped(protection.mode.as_str(), filtered.skipped.len());
    }
    let previously_skipped = resource.status.as_ref().map(|s| &s.labels_skipped);
    if protection.mode == ProtectionMode::Warn && previously_skipped != Some(&filtered.skipped) {
        for warning in &filtered.warnings {
            publish(ctx, resource, EventRecord::warning(EVENT_REASON_PROTECTED_LABEL_SKIPPED, warning.clone())).await;
        }
    }

    let report = SyncReport::synced(
        &target,
        filtered.allowed.keys().cloned().collect(),
        filtered.skipped,
    );
    update_status(&mut status, resource.metadata.generation, &report);
    if status_needs_update(resource.status.as_ref(), &status) {
        ctx.store.apply_status(resource, &status).await?;
    }

    Ok(ReconcileOutcome::Done)
}

/// The labels this operator owns after a sync pass.
///
/// Everything allowed in this pass, plus previously applied keys that are still
/// desired but were skipped, as long as the namespace still carries the value we
/// wrote. Those remain ours to remove on teardown.
fn owned_labels(filtered: &FilterOutcome, prev_applied: &LabelMap, live: &LabelMap) -> LabelMap {
    let mut owned = filtered.allowed.clone();
    for key in &filtered.skipped {
        if let Some(value) = prev_applied.get(key) {
            if live.get(key) == Some(value) {
                owned.insert(key.clone(), value.clone());
            }
        }
    }
    owned
}

fn namespace_changed(before: &Namespace, after: &Namespace) -> bool {
    before.metadata.labels != after.metadata.labels
        || before.metadata.annotations != after.metadata.annotations
}

/// Persist a failing status for a fail-mode conflict and hand the error back.
///
/// The namespace is left untouched.
async fn protection_failure(
    ctx: &Context,
    resource: &NamespaceLabel,
    target: &str,
    error: ProtectionError,
) -> anyhow::Error {
    warn!(namespace = %target, label = %error.key(), error = %error, "Protection conflict blocked label sync");
    metrics::record_protection_conflict(target);
    publish(ctx, resource, EventRecord::warning(EVENT_REASON_PROTECTION_ERROR, error.to_string())).await;

    let mut status = resource.status.clone().unwrap_or_default();
    update_status(&mut status, resource.metadata.generation, &SyncReport::protection_failed(&error));
    if status_needs_update(resource.status.as_ref(), &status) {
        if let Err(status_error) = ctx.store.apply_status(resource, &status).await {
            warn!(namespace = %target, error = %status_error, "Failed to record protection failure in status");
        }
    }

    error.into()
}

/// The Terminating transition: remove every label we applied, then release the finalizer.
async fn teardown(ctx: &Context, resource: &NamespaceLabel) -> Result<ReconcileOutcome> {
    if !has_finalizer(resource, FINALIZER_NAMESPACE_LABEL) {
        debug!(name = %resource.name_any(), "NamespaceLabel terminating without our finalizer");
        return Ok(ReconcileOutcome::Done);
    }

    let target = target_namespace(resource)?;
    let mut status = resource.status.clone().unwrap_or_default();

    match ctx.store.get_namespace(&target).await? {
        None => {
            info!(namespace = %target, "Target namespace already gone, skipping label removal");
            ctx.snapshot_store
                .store_applied_snapshot(&mut status, None, &LabelMap::new())?;
        }
        Some(live_namespace) => {
            let prev_applied = ctx
                .snapshot_store
                .load_applied_snapshot(resource, Some(&live_namespace));

            let mut updated_namespace = live_namespace.clone();
            let mut labels = live_namespace.metadata.labels.clone().unwrap_or_default();
            if remove_stale(&mut labels, &LabelMap::new(), &prev_applied) {
                updated_namespace.metadata.labels = Some(labels);
            }
            ctx.snapshot_store.store_applied_snapshot(
                &mut status,
                Some(&mut updated_namespace),
                &LabelMap::new(),
            )?;

            if namespace_changed(&live_namespace, &updated_namespace) {
                if let Err(e) = ctx.store.replace_namespace(&updated_namespace).await {
                    warn!(
                        namespace = %target,
                        error = %e,
                        "Failed to remove applied labels, keeping finalizer"
                    );
                    metrics::record_reconciliation_requeue(KIND_NAMESPACE_LABEL, "teardown_retry");
                    return Ok(ReconcileOutcome::RequeueAfter(Duration::from_secs(
                        TEARDOWN_RETRY_REQUEUE_SECS,
                    )));
                }
                info!(namespace = %target, "Removed applied labels");
            }
        }
    }

    let resource = if resource.status.is_some() && status_needs_update(resource.status.as_ref(), &status) {
        ctx.store.apply_status(resource, &status).await?
    } else {
        resource.clone()
    };

    remove_finalizer(ctx.store.as_ref(), &resource, FINALIZER_NAMESPACE_LABEL).await?;
    Ok(ReconcileOutcome::Done)
}

/// Publish an event; failures are logged and never fail the pass.
async fn publish(ctx: &Context, resource: &NamespaceLabel, event: EventRecord) {
    let reason = event.reason.clone();
    if let Err(e) = ctx.store.publish_event(resource, event).await {
        warn!(name = %resource.name_any(), reason = %reason, error = %e, "Failed to publish event");
    }
}

#[cfg(test)]
#[path = "namespacelabel_tests.rs"]
mod namespacelabel_tests;
