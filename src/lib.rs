// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # nslabel - Namespace Label Operator for Kubernetes
//!
//! nslabel lets tenants manage the labels of their own namespace through a
//! namespaced `NamespaceLabel` custom resource, while cluster administrators keep
//! control over protected label keys.
//!
//! ## Overview
//!
//! - Desired labels from `NamespaceLabel.spec.labels` are applied to the containing
//!   namespace and kept there (manual drift is corrected).
//! - Labels the operator applied earlier and that are no longer desired are removed,
//!   unless someone changed their value in the meantime.
//! - Keys matching administrator-defined glob patterns are protected; a conflicting
//!   desired value is skipped, skipped with a warning event, or fails the pass.
//! - Deleting the resource removes every label it applied.
//!
//! ## Modules
//!
//! - [`crd`] - The `NamespaceLabel` custom resource and its status
//! - [`pattern`] - Glob matching for protected label keys
//! - [`protection`] - Protection configuration and the protection filter
//! - [`reconcilers`] - Label set algebra, drift detection and the reconcile state machine
//! - [`store`] - Object store seam over the Kubernetes API
//! - [`context`] - Shared controller context
//! - [`metrics`] - Prometheus metrics and the HTTP server exposing them
//!
//! ## Example
//!
//! ```rust
//! use nslabel::protection::{filter_protected_labels, ProtectionConfig, ProtectionMode};
//! use std::collections::BTreeMap;
//!
//! let config = ProtectionConfig {
//!     patterns: vec!["kubernetes.io/*".to_string()],
//!     mode: ProtectionMode::Skip,
//! };
//! let desired = BTreeMap::from([
//!     ("env".to_string(), "prod".to_string()),
//!     ("kubernetes.io/managed-by".to_string(), "tenant".to_string()),
//! ]);
//! let existing = BTreeMap::from([
//!     ("kubernetes.io/managed-by".to_string(), "platform".to_string()),
//! ]);
//!
//! let outcome = filter_protected_labels(&desired, &existing, &config).unwrap();
//! assert_eq!(outcome.skipped, vec!["kubernetes.io/managed-by".to_string()]);
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod pattern;
pub mod protection;
pub mod reconcilers;
pub mod status_reasons;
pub mod store;
