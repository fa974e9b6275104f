// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label, annotation and finalizer keys owned by the operator.
//!
//! Everything the operator writes onto objects it does not own (namespaces) or
//! onto its own custom resource is keyed by one of these constants.

// ============================================================================
// Annotations
// ============================================================================

/// Namespace annotation holding the JSON-serialized applied label snapshot
/// (annotation snapshot strategy only).
pub const APPLIED_LABELS_ANNOTATION: &str = "labels.shahaf.com/applied";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer for `NamespaceLabel` resources
pub const FINALIZER_NAMESPACE_LABEL: &str = "labels.shahaf.com/finalizer";
