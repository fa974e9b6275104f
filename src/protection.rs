// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Protection of administrator-owned namespace labels.
//!
//! Administrators maintain a singleton `ConfigMap` listing protected label-key
//! patterns and a [`ProtectionMode`]. Before any label is written, the desired labels
//! of a `NamespaceLabel` are partitioned by [`filter_protected_labels`] into labels
//! that may be applied and protected labels that would overwrite an existing,
//! different value.
//!
//! # ConfigMap Format
//!
//! ```yaml
//! apiVersion: v1
//! kind: ConfigMap
//! metadata:
//!   name: namespacelabel-protection-config
//!   namespace: namespacelabel-system
//! data:
//!   patterns: |
//!     - "kubernetes.io/*"
//!     - "*.istio.io/*"
//!   mode: skip   # skip | warn | fail
//! ```
//!
//! A missing `ConfigMap` means "nothing is protected"; an unknown mode means `skip`.
//! Neither is an error.

use crate::constants::{
    PROTECTION_MODE_FAIL, PROTECTION_MODE_KEY, PROTECTION_MODE_SKIP, PROTECTION_MODE_WARN,
    PROTECTION_PATTERNS_KEY,
};
use crate::crd::LabelMap;
use crate::errors::ProtectionError;
use crate::pattern::is_protected;
use k8s_openapi::api::core::v1::ConfigMap;
use std::fmt;
use tracing::{info, warn};

/// Policy applied when a desired label collides with a protected namespace label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtectionMode {
    /// Leave the existing value in place and continue with the other labels.
    #[default]
    Skip,
    /// Like [`ProtectionMode::Skip`], additionally recording a warning per skipped key.
    Warn,
    /// Abort the pass without applying anything.
    Fail,
}

impl ProtectionMode {
    /// Parse a mode string leniently.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Anything that
    /// is not a known mode falls back to [`ProtectionMode::Skip`] with an
    /// informational log record.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            PROTECTION_MODE_SKIP => Self::Skip,
            PROTECTION_MODE_WARN => Self::Warn,
            PROTECTION_MODE_FAIL => Self::Fail,
            _ => {
                info!(
                    configured_mode = %raw,
                    valid_modes = ?[PROTECTION_MODE_SKIP, PROTECTION_MODE_WARN, PROTECTION_MODE_FAIL],
                    default_mode = PROTECTION_MODE_SKIP,
                    "Invalid protection mode detected, defaulting to 'skip'"
                );
                Self::Skip
            }
        }
    }

    /// The canonical lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => PROTECTION_MODE_SKIP,
            Self::Warn => PROTECTION_MODE_WARN,
            Self::Fail => PROTECTION_MODE_FAIL,
        }
    }
}

impl fmt::Display for ProtectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protected patterns plus the policy for conflicts.
///
/// The default value protects nothing and uses [`ProtectionMode::Skip`], which is
/// exactly what an absent `ConfigMap` means.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectionConfig {
    /// Glob patterns in evaluation order.
    pub patterns: Vec<String>,
    /// Conflict policy.
    pub mode: ProtectionMode,
}

impl ProtectionConfig {
    /// Build the configuration from the protection `ConfigMap`, if it exists.
    #[must_use]
    pub fn from_config_map(config_map: Option<&ConfigMap>) -> Self {
        let Some(data) = config_map.and_then(|cm| cm.data.as_ref()) else {
            return Self::default();
        };

        let patterns = data
            .get(PROTECTION_PATTERNS_KEY)
            .map(|raw| parse_patterns(raw))
            .unwrap_or_default();

        let mode = data
            .get(PROTECTION_MODE_KEY)
            .map(|raw| ProtectionMode::parse_lenient(raw))
            .unwrap_or_default();

        Self { patterns, mode }
    }
}

/// Parse the `patterns` value of the protection `ConfigMap`.
///
/// The value is normally a YAML list of strings. Values that are not (an unquoted
/// `- *.istio.io/*` is a YAML alias, for instance) are read entry by entry instead:
/// a `[a, b]` flow list is unwrapped and split on commas, otherwise the value is
/// split into lines. Blank entries and `#` comments (whole-line or trailing ` #`)
/// are dropped, and a leading `- ` list marker and surrounding quotes are stripped.
#[must_use]
pub fn parse_patterns(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    if let Ok(patterns) = serde_yaml::from_str::<Vec<String>>(raw) {
        return patterns;
    }

    let lines: Vec<&str> = raw
        .lines()
        .map(|line| strip_comment(line).trim())
        .filter(|line| !line.is_empty())
        .collect();
    let joined = lines.join("\n");

    let entries: Vec<&str> = match joined.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        Some(body) => body.split([',', '\n']).collect(),
        None => lines,
    };

    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.strip_prefix('-').map_or(entry, str::trim_start))
        .map(strip_quotes)
        .filter(|pattern| !pattern.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Cut a `#` comment that starts the entry or follows whitespace, outside quotes.
fn strip_comment(entry: &str) -> &str {
    let mut quote = None;
    let mut previous = None;
    for (index, c) in entry.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') if previous.is_none_or(char::is_whitespace) => return &entry[..index],
            (None, _) => {}
        }
        previous = Some(c);
    }
    entry
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Result of a successful protection filter pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    /// Desired labels that may be written.
    pub allowed: LabelMap,
    /// Protected keys left untouched, in key order.
    pub skipped: Vec<String>,
    /// Human-readable warnings, populated only in [`ProtectionMode::Warn`].
    pub warnings: Vec<String>,
}

/// Partition desired labels into allowed and skipped according to protection rules.
///
/// For every desired pair:
/// - unprotected keys are always allowed;
/// - protected keys absent from `existing`, or present with the same value, are allowed;
/// - protected keys present with a different value are a conflict, handled per
///   `config.mode`.
///
/// Labels on the namespace that are not mentioned in `desired` are never inspected.
///
/// # Errors
///
/// In [`ProtectionMode::Fail`] the first conflict aborts the whole filter with a
/// [`ProtectionError`]; no partial result is returned.
pub fn filter_protected_labels(
    desired: &LabelMap,
    existing: &LabelMap,
    config: &ProtectionConfig,
) -> Result<FilterOutcome, ProtectionError> {
    let mut outcome = FilterOutcome::default();

    for (key, value) in desired {
        if is_protected(key, &config.patterns) {
            if let Some(existing_value) = existing.get(key).filter(|v| *v != value) {
                match config.mode {
                    ProtectionMode::Fail => {
                        return Err(ProtectionError::Conflict {
                            key: key.clone(),
                            existing: existing_value.clone(),
                            attempted: value.clone(),
                        });
                    }
                    ProtectionMode::Warn => {
                        let warning = format!(
                            "protected label '{key}' was not modified (existing: '{existing_value}', attempted: '{value}')"
                        );
                        warn!(label = %key, "{}", warning);
                        outcome.warnings.push(warning);
                        outcome.skipped.push(key.clone());
                        continue;
                    }
                    ProtectionMode::Skip => {
                        outcome.skipped.push(key.clone());
                        continue;
                    }
                }
            }
        }

        outcome.allowed.insert(key.clone(), value.clone());
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "protection_tests.rs"]
mod protection_tests;
