// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `NamespaceLabel` resources.
//!
//! The reconciler follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - `NamespaceLabel`s, their namespaces and the protection `ConfigMap`
//! 2. **Reconcile** - Compare the desired labels with the live namespace labels
//! 3. **Update** - Write the namespace, keeping track of which labels we own
//! 4. **Status** - Report the outcome on the resource
//!
//! The pure building blocks ([`label_set`], [`drift`], [`snapshot`], [`status`]) are
//! kept separate from the state machine in [`namespacelabel`], which is the only part
//! talking to the object store.

pub mod drift;
pub mod finalizers;
pub mod label_set;
pub mod namespacelabel;
pub mod snapshot;
pub mod status;

pub use namespacelabel::{reconcile_namespacelabel, LifecycleState, ReconcileOutcome};
