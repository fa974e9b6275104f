// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `NamespaceLabel` controller.
//!
//! The controller receives an `Arc<Context>` holding:
//! - the object store the reconciler reads from and writes to
//! - the location of the protection `ConfigMap`
//! - the applied snapshot strategy
//!
//! The protection configuration itself is loaded fresh on every pass and handed
//! to the protection filter as a value.

use crate::config::OperatorConfig;
use crate::constants::{PROTECTION_CONFIG_MAP_NAME, PROTECTION_NAMESPACE};
use crate::protection::ProtectionConfig;
use crate::reconcilers::snapshot::SnapshotStore;
use crate::store::LabelStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Object store for API operations
    pub store: Arc<dyn LabelStore>,

    /// Namespace of the protection `ConfigMap`
    pub protection_namespace: String,

    /// Name of the protection `ConfigMap`
    pub protection_config_map: String,

    /// Where the applied label snapshot lives
    pub snapshot_store: SnapshotStore,
}

impl Context {
    /// Build the context from the operator configuration.
    #[must_use]
    pub fn new(store: Arc<dyn LabelStore>, config: &OperatorConfig) -> Self {
        Self {
            store,
            protection_namespace: config.protection_namespace.clone(),
            protection_config_map: config.protection_config_map.clone(),
            snapshot_store: config.snapshot_store,
        }
    }

    /// Context with the default protection `ConfigMap` location and status snapshots.
    #[must_use]
    pub fn with_defaults(store: Arc<dyn LabelStore>) -> Self {
        Self {
            store,
            protection_namespace: PROTECTION_NAMESPACE.to_string(),
            protection_config_map: PROTECTION_CONFIG_MAP_NAME.to_string(),
            snapshot_store: SnapshotStore::default(),
        }
    }

    /// Read the current protection configuration.
    ///
    /// A missing `ConfigMap` yields the default configuration (nothing protected).
    ///
    /// # Errors
    ///
    /// Returns an error if the `ConfigMap` cannot be read.
    pub async fn load_protection_config(&self) -> Result<ProtectionConfig> {
        let config_map = self
            .store
            .get_config_map(&self.protection_namespace, &self.protection_config_map)
            .await?;

        if config_map.is_none() {
            debug!(
                namespace = %self.protection_namespace,
                name = %self.protection_config_map,
                "Protection ConfigMap not found, nothing is protected"
            );
        }

        Ok(ProtectionConfig::from_config_map(config_map.as_ref()))
    }

    /// Whether a `ConfigMap` is the protection `ConfigMap` this operator watches.
    #[must_use]
    pub fn is_protection_config_map(&self, namespace: Option<&str>, name: &str) -> bool {
        namespace == Some(self.protection_namespace.as_str()) && name == self.protection_config_map
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
