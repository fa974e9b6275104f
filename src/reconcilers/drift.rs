// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Out-of-band label drift detection for `NamespaceLabel` resources.
//!
//! Drift means a label the operator applied and still wants has been changed or
//! removed on the namespace by someone else. Detection is advisory: the sync always
//! re-asserts desired values regardless, and drift only produces an event, a log
//! record and a metric.

use crate::crd::LabelMap;

/// Keys applied previously and still desired whose live value no longer matches.
///
/// Returned in key order.
#[must_use]
pub fn drifted_keys(live: &LabelMap, prev_applied: &LabelMap, desired: &LabelMap) -> Vec<String> {
    prev_applied
        .iter()
        .filter(|(key, _)| desired.contains_key(*key))
        .filter(|(key, applied_value)| live.get(*key) != Some(*applied_value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Whether any managed label drifted from the value the operator last applied.
///
/// # Returns
///
/// * `true` - Drift detected (a still-desired label is missing or differs)
/// * `false` - Every still-desired label carries its applied value
#[must_use]
pub fn detect_drift(live: &LabelMap, prev_applied: &LabelMap, desired: &LabelMap) -> bool {
    !drifted_keys(live, prev_applied, desired).is_empty()
}

#[cfg(test)]
#[path = "drift_tests.rs"]
mod drift_tests;
