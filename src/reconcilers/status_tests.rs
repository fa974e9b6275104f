// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Condition, NamespaceLabelStatus};
    use crate::errors::ProtectionError;
    use crate::reconcilers::status::{
        conditions_equal, create_condition, find_condition, status_needs_update,
        update_condition_in_memory, update_status, SyncReport,
    };
    use crate::status_reasons::{
        CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY,
        REASON_PROTECTION_ERROR, REASON_SYNCED,
    };

    const OLD_TIME: &str = "2024-01-01T00:00:00+00:00";

    fn ready(status: &str, message: &str) -> Condition {
        Condition {
            r#type: CONDITION_TYPE_READY.to_string(),
            status: status.to_string(),
            reason: Some(REASON_SYNCED.to_string()),
            message: Some(message.to_string()),
            observed_generation: Some(1),
            last_transition_time: Some(OLD_TIME.to_string()),
        }
    }

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition("Ready", "True", "Synced", "ok", Some(3));

        assert_eq!(condition.r#type, "Ready");
        assert_eq!(condition.status, "True");
        assert_eq!(condition.reason.as_deref(), Some("Synced"));
        assert_eq!(condition.message.as_deref(), Some("ok"));
        assert_eq!(condition.observed_generation, Some(3));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![ready("True", "a")];
        assert!(find_condition(&conditions, CONDITION_TYPE_READY).is_some());
        assert!(find_condition(&conditions, "Degraded").is_none());
    }

    #[test]
    fn test_update_condition_replaces_instead_of_appending() {
        let mut conditions = vec![ready("True", "old")];

        update_condition_in_memory(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            REASON_SYNCED,
            "new",
            Some(2),
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].message.as_deref(), Some("new"));
        assert_eq!(conditions[0].observed_generation, Some(2));
    }

    #[test]
    fn test_update_condition_preserves_time_when_status_unchanged() {
        let mut conditions = vec![ready("True", "old")];

        update_condition_in_memory(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_TRUE,
            REASON_SYNCED,
            "new",
            Some(1),
        );

        assert_eq!(conditions[0].last_transition_time.as_deref(), Some(OLD_TIME));
    }

    #[test]
    fn test_update_condition_new_time_when_status_flips() {
        let mut conditions = vec![ready("True", "old")];

        update_condition_in_memory(
            &mut conditions,
            CONDITION_TYPE_READY,
            CONDITION_STATUS_FALSE,
            REASON_PROTECTION_ERROR,
            "blocked",
            Some(1),
        );

        assert_eq!(conditions.len(), 1);
        assert_ne!(conditions[0].last_transition_time.as_deref(), Some(OLD_TIME));
    }

    #[test]
    fn test_conditions_equal_ignores_timestamp() {
        let a = vec![ready("True", "same")];
        let mut b = vec![ready("True", "same")];
        b[0].last_transition_time = Some("2030-01-01T00:00:00+00:00".to_string());

        assert!(conditions_equal(&a, &b));
    }

    #[test]
    fn test_conditions_equal_detects_differences() {
        let base = vec![ready("True", "same")];

        assert!(!conditions_equal(&base, &[ready("False", "same")]));
        assert!(!conditions_equal(&base, &[ready("True", "different")]));
        assert!(!conditions_equal(&base, &[]));

        let mut newer_generation = ready("True", "same");
        newer_generation.observed_generation = Some(2);
        assert!(!conditions_equal(&base, &[newer_generation]));
    }

    #[test]
    fn test_synced_report_message() {
        let report = SyncReport::synced("payments", keys(&["env", "team"]), vec![]);
        assert!(report.ok);
        assert_eq!(report.reason, REASON_SYNCED);
        assert_eq!(report.message, "Applied 2 labels to namespace 'payments'");

        let report = SyncReport::synced("payments", keys(&["env"]), keys(&["kubernetes.io/x"]));
        assert_eq!(
            report.message,
            "Applied 1 of 2 labels to namespace 'payments', skipped 1 protected labels ([kubernetes.io/x])"
        );
    }

    #[test]
    fn test_protection_failed_report() {
        let error = ProtectionError::Conflict {
            key: "kubernetes.io/managed-by".to_string(),
            existing: "system".to_string(),
            attempted: "operator".to_string(),
        };
        let report = SyncReport::protection_failed(&error);

        assert!(!report.ok);
        assert_eq!(report.reason, REASON_PROTECTION_ERROR);
        assert!(report.message.contains("kubernetes.io/managed-by"));
        assert!(report.applied.is_empty());
    }

    #[test]
    fn test_update_status_success() {
        let mut status = NamespaceLabelStatus::default();
        let report = SyncReport::synced("ns", keys(&["env", "team"]), keys(&["k8s.io/x"]));

        update_status(&mut status, Some(4), &report);

        assert!(status.applied);
        assert_eq!(status.labels_applied, keys(&["env", "team"]));
        assert_eq!(status.labels_skipped, keys(&["k8s.io/x"]));
        assert_eq!(status.observed_generation, Some(4));
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].status, CONDITION_STATUS_TRUE);
    }

    #[test]
    fn test_update_status_failure_clears_lists() {
        let mut status = NamespaceLabelStatus {
            applied: true,
            labels_applied: keys(&["env"]),
            ..Default::default()
        };
        let error = ProtectionError::Conflict {
            key: "k".to_string(),
            existing: "a".to_string(),
            attempted: "b".to_string(),
        };

        update_status(&mut status, Some(2), &SyncReport::protection_failed(&error));

        assert!(!status.applied);
        assert!(status.labels_applied.is_empty());
        assert_eq!(status.conditions[0].status, CONDITION_STATUS_FALSE);
        assert_eq!(
            status.conditions[0].reason.as_deref(),
            Some(REASON_PROTECTION_ERROR)
        );
    }

    #[test]
    fn test_status_needs_update() {
        let report = SyncReport::synced("ns", keys(&["env"]), vec![]);
        let mut first = NamespaceLabelStatus::default();
        update_status(&mut first, Some(1), &report);

        assert!(status_needs_update(None, &first));

        let mut second = first.clone();
        update_status(&mut second, Some(1), &report);
        assert!(!status_needs_update(Some(&first), &second));

        let mut third = first.clone();
        third.applied_labels.insert("env".to_string(), "prod".to_string());
        assert!(status_needs_update(Some(&first), &third));
    }
}
