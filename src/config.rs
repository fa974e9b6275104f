// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator runtime configuration.
//!
//! Every setting is a command-line flag with an environment variable fallback, so
//! the operator can be configured from a Deployment manifest without arguments.
//!
//! | Flag | Environment | Default |
//! |---|---|---|
//! | `--protection-config-map` | `NSLABEL_PROTECTION_CONFIG_MAP` | `namespacelabel-protection-config` |
//! | `--protection-namespace` | `NSLABEL_PROTECTION_NAMESPACE` | `namespacelabel-system` |
//! | `--snapshot-store` | `NSLABEL_SNAPSHOT_STORE` | `status` |
//! | `--metrics-bind-address` | `NSLABEL_METRICS_BIND_ADDRESS` | `0.0.0.0` |
//! | `--metrics-port` | `NSLABEL_METRICS_PORT` | `8080` |
//! | `--log-format` | `RUST_LOG_FORMAT` | `text` |

use crate::constants::{
    METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PORT, PROTECTION_CONFIG_MAP_NAME,
    PROTECTION_NAMESPACE,
};
use crate::reconcilers::snapshot::SnapshotStore;
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact, ANSI-colored text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Command-line and environment configuration of the operator.
#[derive(Debug, Clone, Parser)]
#[command(name = "nslabel", version, about = "Synchronizes NamespaceLabel resources onto their namespaces")]
pub struct OperatorConfig {
    /// Name of the administrator-owned protection ConfigMap
    #[arg(long, env = "NSLABEL_PROTECTION_CONFIG_MAP", default_value = PROTECTION_CONFIG_MAP_NAME)]
    pub protection_config_map: String,

    /// Namespace of the protection ConfigMap
    #[arg(long, env = "NSLABEL_PROTECTION_NAMESPACE", default_value = PROTECTION_NAMESPACE)]
    pub protection_namespace: String,

    /// Where the applied label snapshot is persisted
    #[arg(long, env = "NSLABEL_SNAPSHOT_STORE", value_enum, default_value_t = SnapshotStore::Status)]
    pub snapshot_store: SnapshotStore,

    /// Address the metrics and health server binds to
    #[arg(long, env = "NSLABEL_METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: IpAddr,

    /// Port of the metrics and health server
    #[arg(long, env = "NSLABEL_METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    pub metrics_port: u16,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl OperatorConfig {
    /// Socket address of the metrics and health server.
    #[must_use]
    pub fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.metrics_bind_address, self.metrics_port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
