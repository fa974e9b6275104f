// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Object store access for the reconciler.
//!
//! The reconciler reads and writes exactly three kinds of objects: its own
//! `NamespaceLabel`, the namespace that contains it, and the protection `ConfigMap`.
//! [`LabelStore`] narrows the Kubernetes API down to those operations so that the
//! state machine can be driven against a real cluster ([`KubeStore`]) or an
//! in-memory double in tests.
//!
//! All writes are optimistic: namespace replacements carry the `resourceVersion`
//! they were read at, so a concurrent edit surfaces as a conflict error and the
//! pass is retried instead of clobbering the other writer.

use crate::constants::{API_GROUP_VERSION, FIELD_MANAGER, KIND_NAMESPACE_LABEL};
use crate::crd::{NamespaceLabel, NamespaceLabelStatus};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::api::{Patch, PatchParams, PostParams};
use kube::runtime::events::{Event, EventType, Recorder};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Severity of an emitted Kubernetes event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Normal,
    Warning,
}

/// A Kubernetes event about a `NamespaceLabel`, independent of the client library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub severity: EventSeverity,
    pub reason: String,
    pub note: String,
}

impl EventRecord {
    #[must_use]
    pub fn warning(reason: &str, note: impl Into<String>) -> Self {
        Self {
            severity: EventSeverity::Warning,
            reason: reason.to_string(),
            note: note.into(),
        }
    }
}

/// The object store operations the reconciler depends on.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Fetch a `NamespaceLabel`, `None` when it does not exist.
    async fn get_namespace_label(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>>;

    /// Fetch a namespace, `None` when it does not exist.
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>>;

    /// Fetch a `ConfigMap`, `None` when it does not exist.
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>>;

    /// Replace a namespace, failing on a `resourceVersion` conflict.
    async fn replace_namespace(&self, namespace: &Namespace) -> Result<Namespace>;

    /// Persist the complete status of a `NamespaceLabel`, returning the updated object.
    async fn apply_status(
        &self,
        resource: &NamespaceLabel,
        status: &NamespaceLabelStatus,
    ) -> Result<NamespaceLabel>;

    /// Overwrite the finalizer list of a `NamespaceLabel`.
    ///
    /// The write is conditional on the `resourceVersion` carried by `resource`.
    async fn patch_finalizers(&self, resource: &NamespaceLabel, finalizers: Vec<String>) -> Result<()>;

    /// Publish an event attached to a `NamespaceLabel`.
    async fn publish_event(&self, resource: &NamespaceLabel, event: EventRecord) -> Result<()>;
}

/// [`LabelStore`] backed by the Kubernetes API server.
pub struct KubeStore {
    client: Client,
    recorder: Recorder,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client, recorder: Recorder) -> Self {
        Self { client, recorder }
    }

    fn resource_api(&self, resource: &NamespaceLabel) -> Api<NamespaceLabel> {
        Api::namespaced(self.client.clone(), &resource.namespace().unwrap_or_default())
    }
}

#[async_trait]
impl LabelStore for KubeStore {
    async fn get_namespace_label(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>> {
        let api: Api<NamespaceLabel> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .with_context(|| format!("failed to get NamespaceLabel {namespace}/{name}"))
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(name)
            .await
            .with_context(|| format!("failed to get namespace {name}"))
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await
            .with_context(|| format!("failed to get ConfigMap {namespace}/{name}"))
    }

    async fn replace_namespace(&self, namespace: &Namespace) -> Result<Namespace> {
        let name = namespace.name_any();
        let api: Api<Namespace> = Api::all(self.client.clone());
        let updated = api
            .replace(&name, &PostParams::default(), namespace)
            .await
            .with_context(|| format!("failed to update namespace {name}"))?;
        debug!(namespace = %name, "Updated namespace labels");
        Ok(updated)
    }

    async fn apply_status(
        &self,
        resource: &NamespaceLabel,
        status: &NamespaceLabelStatus,
    ) -> Result<NamespaceLabel> {
        let name = resource.name_any();
        let api = self.resource_api(resource);

        // Server-side apply of the whole status drops map keys we no longer send
        let patch = json!({
            "apiVersion": API_GROUP_VERSION,
            "kind": KIND_NAMESPACE_LABEL,
            "status": status,
        });
        api.patch_status(&name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(&patch))
            .await
            .with_context(|| format!("failed to update status of NamespaceLabel {name}"))
    }

    async fn patch_finalizers(&self, resource: &NamespaceLabel, finalizers: Vec<String>) -> Result<()> {
        let name = resource.name_any();
        let api = self.resource_api(resource);
        let patch = json!({
            "metadata": {
                "finalizers": finalizers,
                "resourceVersion": resource.resource_version(),
            }
        });
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("failed to patch finalizers of NamespaceLabel {name}"))?;
        Ok(())
    }

    async fn publish_event(&self, resource: &NamespaceLabel, event: EventRecord) -> Result<()> {
        let event = Event {
            type_: match event.severity {
                EventSeverity::Normal => EventType::Normal,
                EventSeverity::Warning => EventType::Warning,
            },
            reason: event.reason,
            note: Some(event.note),
            action: crate::status_reasons::EVENT_ACTION_SYNC.to_string(),
            secondary: None,
        };
        self.recorder
            .publish(&event, &resource.object_ref(&()))
            .await
            .context("failed to publish event")?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory;
