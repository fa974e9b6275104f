// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition and event reasons for `NamespaceLabel` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Type
//!
//! A `NamespaceLabel` carries a single `type: Ready` condition. It is replaced in place
//! on every pass that reaches a terminal outcome, never appended.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   applied: true
//!   labelsApplied: [env, team]
//!   conditions:
//!     - type: Ready
//!       status: "True"
//!       reason: Synced
//!       message: "Applied 2 labels to namespace 'payments'"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// The only condition type maintained on `NamespaceLabel` status.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status value for a successful pass.
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status value for a failed pass.
pub const CONDITION_STATUS_FALSE: &str = "False";

// ============================================================================
// Condition Reasons
// ============================================================================

/// Desired labels were synchronized onto the namespace.
///
/// Used even when some protected labels were skipped; the skipped keys are listed in
/// `status.labelsSkipped` and the message.
pub const REASON_SYNCED: &str = "Synced";

/// A desired label conflicted with a protected namespace label in `fail` mode.
///
/// Nothing was applied during the pass that set this reason.
pub const REASON_PROTECTION_ERROR: &str = "ProtectionError";

// ============================================================================
// Event Reasons
// ============================================================================

/// A managed label was changed out of band and is being restored.
pub const EVENT_REASON_DRIFT_DETECTED: &str = "DriftDetected";

/// A protected label was left untouched in `warn` mode.
pub const EVENT_REASON_PROTECTED_LABEL_SKIPPED: &str = "ProtectedLabelSkipped";

/// A fail-mode protection conflict blocked the pass.
pub const EVENT_REASON_PROTECTION_ERROR: &str = "ProtectionError";

/// Event action recorded for label synchronization.
pub const EVENT_ACTION_SYNC: &str = "SyncLabels";

/// Human-readable note attached to drift events.
pub const DRIFT_EVENT_NOTE: &str =
    "Namespace labels were manually modified, restoring to desired state";
