// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the namespace label operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "labels.shahaf.com/v1alpha1";

/// Kind name for `NamespaceLabel` resource
pub const KIND_NAMESPACE_LABEL: &str = "NamespaceLabel";

/// Well-known name of the single `NamespaceLabel` allowed per namespace
pub const STANDARD_CR_NAME: &str = "labels";

// ============================================================================
// Protection Configuration Constants
// ============================================================================

/// Default name of the administrator-owned protection `ConfigMap`
pub const PROTECTION_CONFIG_MAP_NAME: &str = "namespacelabel-protection-config";

/// Default namespace of the protection `ConfigMap`
pub const PROTECTION_NAMESPACE: &str = "namespacelabel-system";

/// `ConfigMap` data key holding the protected glob patterns
pub const PROTECTION_PATTERNS_KEY: &str = "patterns";

/// `ConfigMap` data key holding the protection mode
pub const PROTECTION_MODE_KEY: &str = "mode";

/// Protection mode: skip conflicting protected labels
pub const PROTECTION_MODE_SKIP: &str = "skip";

/// Protection mode: skip conflicting protected labels and record a warning
pub const PROTECTION_MODE_WARN: &str = "warn";

/// Protection mode: abort the pass on a conflicting protected label
pub const PROTECTION_MODE_FAIL: &str = "fail";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after a fail-mode protection conflict (5 minutes)
pub const PROTECTION_FAILURE_REQUEUE_SECS: u64 = 300;

/// Requeue duration when teardown could not update the namespace (1 minute)
pub const TEARDOWN_RETRY_REQUEUE_SECS: u64 = 60;

// ============================================================================
// Controller Identity Constants
// ============================================================================

/// Field manager used for server-side apply of status
pub const FIELD_MANAGER: &str = "nslabel-controller";

/// Reporting controller name used on emitted events
pub const EVENT_REPORTER: &str = "nslabel-controller";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
