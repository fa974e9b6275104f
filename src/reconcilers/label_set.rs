// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label set algebra for namespace label synchronization.
//!
//! Both functions mutate a working copy of the namespace's live labels and report
//! whether anything changed, so the caller can skip the namespace write entirely when
//! nothing did. Neither depends on map iteration order.

use crate::crd::LabelMap;

/// Set every desired label whose live value is absent or different.
///
/// Returns `true` if `current` was modified.
pub fn apply_desired(current: &mut LabelMap, desired: &LabelMap) -> bool {
    let mut changed = false;
    for (key, value) in desired {
        if current.get(key) != Some(value) {
            current.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Remove labels the operator applied before but that are no longer desired.
///
/// A key is only removed when its live value is still exactly the value recorded in
/// `prev_applied`; a value someone else set since the last write is left alone.
///
/// Returns `true` if `current` was modified.
pub fn remove_stale(current: &mut LabelMap, desired: &LabelMap, prev_applied: &LabelMap) -> bool {
    let mut changed = false;
    for (key, prev_value) in prev_applied {
        if desired.contains_key(key) {
            continue;
        }
        if current.get(key) == Some(prev_value) {
            current.remove(key);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
#[path = "label_set_tests.rs"]
mod label_set_tests;
