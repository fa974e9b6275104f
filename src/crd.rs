// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for namespace label management.
//!
//! A [`NamespaceLabel`] declares the labels its own namespace should carry. The
//! operator copies them onto the namespace object, honoring the administrator's
//! protection patterns, and reports the outcome in the resource status.
//!
//! # Example: Declaring Labels
//!
//! ```rust,no_run
//! use nslabel::crd::NamespaceLabelSpec;
//! use std::collections::BTreeMap;
//!
//! let spec = NamespaceLabelSpec {
//!     labels: BTreeMap::from([
//!         ("env".to_string(), "prod".to_string()),
//!         ("team".to_string(), "payments".to_string()),
//!     ]),
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unordered key/value label set.
///
/// Backed by a `BTreeMap` so that anything derived from it (status key lists,
/// the serialized snapshot annotation) is deterministic.
pub type LabelMap = BTreeMap<String, String>;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. `NamespaceLabel` only uses `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The `metadata.generation` the condition was computed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// `NamespaceLabel` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLabelStatus {
    /// Whether the last pass applied the desired labels.
    #[serde(default)]
    pub applied: bool,

    /// Keys applied to the namespace by the last successful pass.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels_applied: Vec<String>,

    /// Keys left untouched because they collide with a protected namespace label.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels_skipped: Vec<String>,

    /// Exactly what the operator last wrote to the namespace.
    ///
    /// Only keys whose live value still equals the value recorded here are ever
    /// removed from the namespace.
    #[serde(default)]
    pub applied_labels: LabelMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// `NamespaceLabel` synchronizes a set of labels onto the namespace that contains it.
///
/// The target namespace is always `metadata.namespace`; a resource can never label a
/// namespace other than its own. Exactly one instance named `labels` is expected per
/// namespace (enforced by an admission webhook, not by the operator).
///
/// # Example
///
/// ```yaml
/// apiVersion: labels.shahaf.com/v1alpha1
/// kind: NamespaceLabel
/// metadata:
///   name: labels
///   namespace: payments
/// spec:
///   labels:
///     env: prod
///     team: payments
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[kube(
    group = "labels.shahaf.com",
    version = "v1alpha1",
    kind = "NamespaceLabel",
    plural = "namespacelabels",
    shortname = "nsl",
    namespaced,
    doc = "NamespaceLabel declares the labels that the namespace containing it should carry.",
    printcolumn = r#"{"name":"Applied","type":"boolean","jsonPath":".status.applied"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "NamespaceLabelStatus")]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLabelSpec {
    /// Labels to apply to the namespace where this resource lives.
    #[serde(default)]
    pub labels: LabelMap,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
