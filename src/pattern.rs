// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Glob matching for protected label keys.
//!
//! Cluster administrators list label-key patterns (e.g. `kubernetes.io/*`,
//! `*.istio.io/*`) that the operator must not silently overwrite. This module decides
//! whether a key matches any of them.
//!
//! # Grammar
//!
//! Matching is delegated to [`glob::Pattern`] and covers the *whole* key:
//!
//! | Syntax    | Matches                                                        |
//! |-----------|----------------------------------------------------------------|
//! | `*`       | any run of characters, including none and including `/`        |
//! | `?`       | exactly one character, including `/`                           |
//! | `[abc]`   | one character from the class                                   |
//! | `[a-z]`   | one character in the inclusive range                           |
//! | `[!a-z]`  | one character *not* in the class                               |
//! | `[*]`     | a literal metacharacter (`[?]`, `[[]`, `[]]` likewise)         |
//! | other     | itself                                                         |
//!
//! Runs of `*` collapse to a single `*` before compiling, so `kubernetes.io/**`
//! behaves exactly like `kubernetes.io/*`. Label keys use `/` as an ordinary
//! character, so no wildcard treats it specially.
//!
//! # Error Tolerance
//!
//! Patterns that fail to compile (for example an unterminated class) never match
//! anything. [`is_protected`] skips them and keeps evaluating the remaining patterns.
//!
//! # Example
//!
//! ```rust
//! use nslabel::pattern::is_protected;
//!
//! let patterns = vec!["kubernetes.io/[".to_string(), "kubernetes.io/*".to_string()];
//! assert!(is_protected("kubernetes.io/test", &patterns));
//! assert!(!is_protected("myapp/label", &patterns));
//! ```

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::debug;

/// A pattern that failed to compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern '{pattern}' at position {position}: {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub position: usize,
    pub reason: String,
}

/// Slash-insensitive, case-sensitive matching over the whole key.
const KEY_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    inner: Pattern,
}

impl GlobPattern {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when the pattern is syntactically invalid.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        Pattern::new(&collapse_stars(pattern))
            .map(|inner| Self { inner })
            .map_err(|e| PatternError {
                pattern: pattern.to_string(),
                position: e.pos,
                reason: e.msg.to_string(),
            })
    }

    /// Whether `key` matches this pattern in its entirety.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.inner.matches_with(key, KEY_MATCH_OPTIONS)
    }
}

/// Collapse every run of `*` into a single `*`.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c != '*' || !collapsed.ends_with('*') {
            collapsed.push(c);
        }
    }
    collapsed
}

/// Decide whether a label key is protected by any of `patterns`.
///
/// Patterns are tried in order and the first match wins. Empty patterns are ignored
/// and malformed ones are treated as non-matching. An empty pattern list protects
/// nothing.
#[must_use]
pub fn is_protected(key: &str, patterns: &[String]) -> bool {
    for pattern in patterns {
        if pattern.is_empty() {
            continue;
        }

        match GlobPattern::compile(pattern) {
            Ok(glob) => {
                if glob.matches(key) {
                    return true;
                }
            }
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Ignoring malformed protection pattern");
            }
        }
    }

    false
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod pattern_tests;
