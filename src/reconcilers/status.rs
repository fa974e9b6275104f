// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status reporting for `NamespaceLabel` resources.
//!
//! Every pass that reaches a terminal outcome (a completed sync or a blocking
//! protection failure) renders its result into a [`SyncReport`] and folds it into
//! the resource status with [`update_status`]. All changes happen in memory; the
//! reconciler decides with [`status_needs_update`] whether a write is warranted and
//! persists the whole status in a single call.
//!
//! # Condition Format
//!
//! A single `Ready` condition is kept:
//! - `status`: "True" after a sync, "False" after a protection failure
//! - `reason`: `Synced` or `ProtectionError`
//! - `observedGeneration`: the resource generation the pass worked from
//! - `lastTransitionTime`: only moves when `status` flips
//!
//! # Example
//!
//! ```rust,ignore
//! use nslabel::reconcilers::status::{update_status, SyncReport};
//!
//! let mut status = resource.status.clone().unwrap_or_default();
//! update_status(&mut status, resource.metadata.generation, &SyncReport::synced("payments", applied, skipped));
//! ```

use crate::crd::{Condition, NamespaceLabelStatus};
use crate::errors::ProtectionError;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_PROTECTION_ERROR,
    REASON_SYNCED,
};
use chrono::Utc;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        observed_generation,
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// Any existing condition of the same type is replaced in place, never duplicated.
/// Its `lastTransitionTime` is preserved when the status value is unchanged.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) {
    let previous_time = find_condition(conditions, condition_type)
        .filter(|c| c.status == status)
        .and_then(|c| c.last_transition_time.clone());

    conditions.retain(|c| c.r#type != condition_type);

    let mut condition = create_condition(condition_type, status, reason, message, observed_generation);
    if previous_time.is_some() {
        condition.last_transition_time = previous_time;
    }
    conditions.push(condition);
}

/// Compare two condition lists semantically.
///
/// `lastTransitionTime` is ignored; type, status, reason, message and observed
/// generation must all match.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr_cond| {
            curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
                && curr_cond.observed_generation == new_cond.observed_generation
        })
    })
}

/// Whether `new` differs from `current` in anything but condition timestamps.
///
/// # Returns
///
/// * `true` - The status must be written
/// * `false` - Nothing changed, skip the API call
#[must_use]
pub fn status_needs_update(current: Option<&NamespaceLabelStatus>, new: &NamespaceLabelStatus) -> bool {
    let Some(current) = current else {
        return true;
    };

    current.applied != new.applied
        || current.labels_applied != new.labels_applied
        || current.labels_skipped != new.labels_skipped
        || current.applied_labels != new.applied_labels
        || current.observed_generation != new.observed_generation
        || !conditions_equal(&current.conditions, &new.conditions)
}

/// The outcome of one reconciliation pass, ready to be rendered into status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub ok: bool,
    pub reason: String,
    pub message: String,
    /// Keys skipped because of protection, in key order
    pub skipped: Vec<String>,
    /// Keys applied to the namespace, in key order
    pub applied: Vec<String>,
}

impl SyncReport {
    /// A completed sync onto `namespace`.
    #[must_use]
    pub fn synced(namespace: &str, applied: Vec<String>, skipped: Vec<String>) -> Self {
        let message = sync_message(namespace, applied.len(), &skipped);
        Self {
            ok: true,
            reason: REASON_SYNCED.to_string(),
            message,
            skipped,
            applied,
        }
    }

    /// A pass blocked by a fail-mode protection conflict. Nothing was applied.
    #[must_use]
    pub fn protection_failed(error: &ProtectionError) -> Self {
        Self {
            ok: false,
            reason: REASON_PROTECTION_ERROR.to_string(),
            message: error.to_string(),
            skipped: Vec::new(),
            applied: Vec::new(),
        }
    }
}

fn sync_message(namespace: &str, applied: usize, skipped: &[String]) -> String {
    if skipped.is_empty() {
        format!("Applied {applied} labels to namespace '{namespace}'")
    } else {
        format!(
            "Applied {applied} of {} labels to namespace '{namespace}', skipped {} protected labels ([{}])",
            applied + skipped.len(),
            skipped.len(),
            skipped.join(", ")
        )
    }
}

/// Fold `report` into `status` (in-memory, no API call).
///
/// Sets the `applied` flag, the applied/skipped key lists, the observed generation
/// and upserts the `Ready` condition. The applied label snapshot is left to the
/// snapshot strategy.
pub fn update_status(status: &mut NamespaceLabelStatus, generation: Option<i64>, report: &SyncReport) {
    status.applied = report.ok;
    status.labels_applied.clone_from(&report.applied);
    status.labels_skipped.clone_from(&report.skipped);
    status.observed_generation = generation;

    let condition_status = if report.ok {
        CONDITION_STATUS_TRUE
    } else {
        CONDITION_STATUS_FALSE
    };
    update_condition_in_memory(
        &mut status.conditions,
        CONDITION_TYPE_READY,
        condition_status,
        &report.reason,
        &report.message,
        generation,
    );
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
