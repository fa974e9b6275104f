// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`LabelStore`] for driving the reconciler in unit tests.
//!
//! Behaves like a tiny API server: every write bumps `resourceVersion`, namespace
//! replacements made from a stale copy fail with a conflict, and a resource marked
//! for deletion disappears once its last finalizer is removed.

use super::{EventRecord, LabelStore};
use crate::crd::{NamespaceLabel, NamespaceLabelStatus};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::jiff::Timestamp;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    resources: BTreeMap<(String, String), NamespaceLabel>,
    namespaces: BTreeMap<String, Namespace>,
    config_maps: BTreeMap<(String, String), ConfigMap>,
    events: Vec<EventRecord>,
    namespace_writes: usize,
    status_writes: usize,
    finalizer_writes: usize,
    fail_namespace_writes: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn bump(meta: &mut ObjectMeta) {
    let next = meta
        .resource_version
        .as_deref()
        .and_then(|rv| rv.parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    meta.resource_version = Some(next.to_string());
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn insert_namespace(&self, name: &str, labels: &[(&str, &str)]) {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                        .collect(),
                ),
                resource_version: Some("1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        self.lock().namespaces.insert(name.to_string(), namespace);
    }

    pub fn insert_resource(&self, mut resource: NamespaceLabel) {
        bump(&mut resource.metadata);
        let key = (resource.namespace().unwrap_or_default(), resource.name_any());
        self.lock().resources.insert(key, resource);
    }

    pub fn insert_config_map(&self, namespace: &str, name: &str, data: &[(&str, &str)]) {
        let config_map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            ..Default::default()
        };
        self.lock()
            .config_maps
            .insert((namespace.to_string(), name.to_string()), config_map);
    }

    /// Simulate the orchestration layer setting the deletion marker.
    pub fn mark_deleted(&self, namespace: &str, name: &str) {
        let mut state = self.lock();
        let key = (namespace.to_string(), name.to_string());
        let finalized = state.resources.get(&key).is_some_and(|r| {
            r.metadata
                .finalizers
                .as_ref()
                .is_some_and(|f| !f.is_empty())
        });
        if !finalized {
            state.resources.remove(&key);
            return;
        }
        if let Some(resource) = state.resources.get_mut(&key) {
            resource.metadata.deletion_timestamp = Some(Time(Timestamp::now()));
            bump(&mut resource.metadata);
        }
    }

    pub fn delete_namespace(&self, name: &str) {
        self.lock().namespaces.remove(name);
    }

    /// Make every subsequent namespace write fail.
    pub fn fail_namespace_writes(&self, fail: bool) {
        self.lock().fail_namespace_writes = fail;
    }

    /// Edit namespace labels out of band, as a human would.
    pub fn edit_namespace_label(&self, name: &str, key: &str, value: Option<&str>) {
        let mut state = self.lock();
        if let Some(namespace) = state.namespaces.get_mut(name) {
            let labels = namespace.metadata.labels.get_or_insert_with(BTreeMap::new);
            match value {
                Some(value) => labels.insert(key.to_string(), value.to_string()),
                None => labels.remove(key),
            };
            bump(&mut namespace.metadata);
        }
    }

    pub fn namespace_labels(&self, name: &str) -> BTreeMap<String, String> {
        self.lock()
            .namespaces
            .get(name)
            .and_then(|n| n.metadata.labels.clone())
            .unwrap_or_default()
    }

    pub fn namespace(&self, name: &str) -> Option<Namespace> {
        self.lock().namespaces.get(name).cloned()
    }

    pub fn resource(&self, namespace: &str, name: &str) -> Option<NamespaceLabel> {
        self.lock()
            .resources
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().events.clone()
    }

    pub fn namespace_writes(&self) -> usize {
        self.lock().namespace_writes
    }

    pub fn status_writes(&self) -> usize {
        self.lock().status_writes
    }

    pub fn finalizer_writes(&self) -> usize {
        self.lock().finalizer_writes
    }
}

#[async_trait]
impl LabelStore for MemoryStore {
    async fn get_namespace_label(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>> {
        Ok(self.resource(namespace, name))
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>> {
        Ok(self.namespace(name))
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        Ok(self
            .lock()
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn replace_namespace(&self, namespace: &Namespace) -> Result<Namespace> {
        let mut state = self.lock();
        if state.fail_namespace_writes {
            bail!("namespace write rejected");
        }

        let name = namespace.name_any();
        let stored = state
            .namespaces
            .get_mut(&name)
            .ok_or_else(|| anyhow!("namespace {name} not found"))?;
        if stored.metadata.resource_version != namespace.metadata.resource_version {
            bail!("conflict: namespace {name} was modified");
        }

        *stored = namespace.clone();
        bump(&mut stored.metadata);
        let updated = stored.clone();
        state.namespace_writes += 1;
        Ok(updated)
    }

    async fn apply_status(
        &self,
        resource: &NamespaceLabel,
        status: &NamespaceLabelStatus,
    ) -> Result<NamespaceLabel> {
        let mut state = self.lock();
        let key = (resource.namespace().unwrap_or_default(), resource.name_any());
        let stored = state
            .resources
            .get_mut(&key)
            .ok_or_else(|| anyhow!("NamespaceLabel {}/{} not found", key.0, key.1))?;
        stored.status = Some(status.clone());
        bump(&mut stored.metadata);
        let updated = stored.clone();
        state.status_writes += 1;
        Ok(updated)
    }

    async fn patch_finalizers(&self, resource: &NamespaceLabel, finalizers: Vec<String>) -> Result<()> {
        let mut state = self.lock();
        let key = (resource.namespace().unwrap_or_default(), resource.name_any());
        let stored = state
            .resources
            .get_mut(&key)
            .ok_or_else(|| anyhow!("NamespaceLabel {}/{} not found", key.0, key.1))?;
        if resource.metadata.resource_version.is_some()
            && stored.metadata.resource_version != resource.metadata.resource_version
        {
            bail!("conflict: NamespaceLabel {}/{} was modified", key.0, key.1);
        }
        let release = finalizers.is_empty() && stored.metadata.deletion_timestamp.is_some();
        stored.metadata.finalizers = Some(finalizers);
        bump(&mut stored.metadata);
        if release {
            state.resources.remove(&key);
        }
        state.finalizer_writes += 1;
        Ok(())
    }

    async fn publish_event(&self, _resource: &NamespaceLabel, event: EventRecord) -> Result<()> {
        self.lock().events.push(event);
        Ok(())
    }
}
