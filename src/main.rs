// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::{
    runtime::{
        controller::Action,
        events::{Recorder, Reporter},
        reflector::{ObjectRef, Store},
        watcher::Config,
        Controller,
    },
    Api, Client, ResourceExt,
};
use nslabel::{
    config::{LogFormat, OperatorConfig},
    constants::{
        ERROR_REQUEUE_DURATION_SECS, EVENT_REPORTER, KIND_NAMESPACE_LABEL,
        PROTECTION_FAILURE_REQUEUE_SECS, TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::NamespaceLabel,
    errors::{error_category, ProtectionError},
    metrics::{self, ServerState},
    reconcilers::{reconcile_namespacelabel, ReconcileOutcome},
    store::KubeStore,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("nslabel-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO level.
/// Example: `RUST_LOG=debug nslabel --log-format json`
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    init_tracing(config.log_format);

    info!("Starting namespace label operator");
    debug!(config = ?config, "Operator configuration");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let reporter = Reporter {
        controller: EVENT_REPORTER.to_string(),
        instance: std::env::var("POD_NAME").ok(),
    };
    let recorder = Recorder::new(client.clone(), reporter);
    let store = Arc::new(KubeStore::new(client.clone(), recorder));
    let ctx = Arc::new(Context::new(store, &config));
    let server_state = Arc::new(ServerState::default());

    info!(
        protection_namespace = %ctx.protection_namespace,
        protection_config_map = %ctx.protection_config_map,
        snapshot_store = ?ctx.snapshot_store,
        "Starting controllers"
    );

    // The controller only returns after a shutdown signal; the metrics server should never exit
    tokio::select! {
        result = run_namespacelabel_controller(client, ctx) => {
            info!("NamespaceLabel controller stopped");
            result
        }
        result = metrics::run_metrics_server(config.metrics_addr(), server_state) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Run the `NamespaceLabel` controller
///
/// Besides the resources themselves, the controller watches namespaces (so manual
/// label edits are corrected promptly) and the protection `ConfigMap` (so rule
/// changes are applied to every resource).
async fn run_namespacelabel_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting NamespaceLabel controller");

    let api = Api::<NamespaceLabel>::all(client.clone());
    let namespaces = Api::<Namespace>::all(client.clone());
    let config_maps = Api::<ConfigMap>::namespaced(client, &ctx.protection_namespace);

    let controller = Controller::new(api, Config::default());
    let by_namespace = controller.store();
    let everything = controller.store();
    let watch_ctx = ctx.clone();

    controller
        .watches(namespaces, Config::default(), move |namespace: Namespace| {
            resources_in_namespace(&by_namespace, &namespace.name_any())
        })
        .watches(config_maps, Config::default(), move |config_map: ConfigMap| {
            if watch_ctx.is_protection_config_map(config_map.namespace().as_deref(), &config_map.name_any()) {
                all_resources(&everything)
            } else {
                Vec::new()
            }
        })
        .shutdown_on_signal()
        .run(reconcile_namespacelabel_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

fn resources_in_namespace(
    store: &Store<NamespaceLabel>,
    namespace: &str,
) -> Vec<ObjectRef<NamespaceLabel>> {
    store
        .state()
        .iter()
        .filter(|resource| resource.namespace().as_deref() == Some(namespace))
        .map(|resource| ObjectRef::from_obj(resource.as_ref()))
        .collect()
}

fn all_resources(store: &Store<NamespaceLabel>) -> Vec<ObjectRef<NamespaceLabel>> {
    store
        .state()
        .iter()
        .map(|resource| ObjectRef::from_obj(resource.as_ref()))
        .collect()
}

/// Reconcile wrapper for `NamespaceLabel`
async fn reconcile_namespacelabel_wrapper(
    resource: Arc<NamespaceLabel>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    debug!(namespace = %namespace, name = %name, "Reconcile wrapper called for NamespaceLabel");

    match reconcile_namespacelabel(&ctx, &namespace, &name).await {
        Ok(ReconcileOutcome::Done) => {
            metrics::record_reconciliation_success(KIND_NAMESPACE_LABEL, start.elapsed());
            debug!(namespace = %namespace, name = %name, "Successfully reconciled NamespaceLabel");
            Ok(Action::await_change())
        }
        Ok(ReconcileOutcome::RequeueAfter(delay)) => {
            metrics::record_reconciliation_success(KIND_NAMESPACE_LABEL, start.elapsed());
            debug!(namespace = %namespace, name = %name, delay = ?delay, "Requeueing NamespaceLabel");
            Ok(Action::requeue(delay))
        }
        Err(e) => {
            metrics::record_reconciliation_error(KIND_NAMESPACE_LABEL, start.elapsed());
            error!(namespace = %namespace, name = %name, "Failed to reconcile NamespaceLabel: {:#}", e);
            Err(e.into())
        }
    }
}

/// Error policy for the `NamespaceLabel` controller
///
/// Protection conflicts are retried after a fixed, longer delay than other errors.
fn error_policy(resource: Arc<NamespaceLabel>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    metrics::record_error(KIND_NAMESPACE_LABEL, error_category(&err.0));

    if err.0.downcast_ref::<ProtectionError>().is_some() {
        warn!(
            namespace = ?resource.namespace(),
            name = %resource.name_any(),
            "Protection conflict, retrying in {PROTECTION_FAILURE_REQUEUE_SECS}s"
        );
        metrics::record_reconciliation_requeue(KIND_NAMESPACE_LABEL, "protection_error");
        return Action::requeue(Duration::from_secs(PROTECTION_FAILURE_REQUEUE_SECS));
    }

    metrics::record_reconciliation_requeue(KIND_NAMESPACE_LABEL, "error");
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
