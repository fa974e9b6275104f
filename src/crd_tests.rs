// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

#[cfg(test)]
mod tests {
    use crate::constants::{API_GROUP_VERSION, KIND_NAMESPACE_LABEL};
    use crate::crd::{NamespaceLabel, NamespaceLabelSpec, NamespaceLabelStatus};
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    #[test]
    fn test_namespacelabel_api_identity() {
        assert_eq!(NamespaceLabel::group(&()), "labels.shahaf.com");
        assert_eq!(NamespaceLabel::version(&()), "v1alpha1");
        assert_eq!(NamespaceLabel::api_version(&()), API_GROUP_VERSION);
        assert_eq!(NamespaceLabel::kind(&()), KIND_NAMESPACE_LABEL);
        assert_eq!(NamespaceLabel::plural(&()), "namespacelabels");
    }

    #[test]
    fn test_crd_is_namespaced_with_short_name() {
        let crd = NamespaceLabel::crd();
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(
            crd.spec.names.short_names,
            Some(vec!["nsl".to_string()])
        );
    }

    #[test]
    fn test_spec_labels_default_to_empty() {
        let spec: NamespaceLabelSpec = serde_json::from_value(json!({})).unwrap();
        assert!(spec.labels.is_empty());
    }

    #[test]
    fn test_spec_deserializes_labels() {
        let spec: NamespaceLabelSpec =
            serde_json::from_value(json!({"labels": {"env": "prod", "team": "x"}})).unwrap();
        assert_eq!(spec.labels.get("env").map(String::as_str), Some("prod"));
        assert_eq!(spec.labels.get("team").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_status_uses_camel_case() {
        let mut status = NamespaceLabelStatus {
            applied: true,
            labels_applied: vec!["env".to_string()],
            observed_generation: Some(3),
            ..Default::default()
        };
        status
            .applied_labels
            .insert("env".to_string(), "prod".to_string());

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["applied"], json!(true));
        assert_eq!(value["labelsApplied"], json!(["env"]));
        assert_eq!(value["appliedLabels"], json!({"env": "prod"}));
        assert_eq!(value["observedGeneration"], json!(3));
        // Empty skip list is omitted entirely
        assert!(value.get("labelsSkipped").is_none());
    }

    #[test]
    fn test_status_tolerates_missing_fields() {
        let status: NamespaceLabelStatus = serde_json::from_value(json!({})).unwrap();
        assert!(!status.applied);
        assert!(status.applied_labels.is_empty());
        assert!(status.conditions.is_empty());
    }
}
