// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, Resource, ResourceExt,
};
use mission_control::{
    config::OperatorConfig,
    constants::{
        ERROR_REQUEUE_DURATION_SECS, KIND_MISSION, KIND_MISSION_KEY, KIND_STORAGE_BUCKETS,
        KIND_VIRTUAL_MACHINE, NOT_READY_REQUEUE_DURATION_SECS,
        PERMANENT_ERROR_REQUEUE_DURATION_SECS, READY_REQUEUE_DURATION_SECS, TOKIO_THREAD_NAME,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    crd::{Mission, MissionKey, StorageBuckets, VirtualMachine},
    crossplane::{
        crd_name, AwsBucket, AwsInstance, AwsProviderConfig, AzureProviderConfig, GcpBucket,
        GcpInstance, GcpProviderConfig,
    },
    errors::{reason_for, MissionError},
    leader::LeaderElection,
    metrics::{
        record_error, record_reconciliation_error, record_reconciliation_requeue,
        record_reconciliation_success,
    },
    reconcilers::{
        reconcile_mission, reconcile_missionkey, reconcile_storagebuckets,
        reconcile_virtualmachine, resources::crd_installed, status::is_ready,
        status::StatusResource,
    },
    server::{metrics_routes, probe_routes, serve, Readiness},
};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name(TOKIO_THREAD_NAME)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
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

async fn async_main() -> Result<()> {
    let config = OperatorConfig::parse();
    init_logging();

    info!("Starting Mission Control operator");
    debug!(?config, "Parsed operator configuration");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let readiness = Readiness::new();
    spawn_http_servers(&config, readiness.clone());

    let mut leader = if config.leader_elect {
        let mut election = LeaderElection::start(client.clone(), &config).await?;
        election.wait_until_leader().await?;
        Some(election)
    } else {
        info!("Leader election disabled, running controllers unconditionally");
        None
    };

    let ctx = Arc::new(Context::new(client, config));

    info!("Starting all controllers");
    readiness.mark_ready();

    // Controllers should never exit - if one fails, we log it and exit the main process
    let result = tokio::select! {
        result = run_controllers(ctx) => result,
        result = leadership_lost(leader.as_mut()) => result,
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, stopping controllers");
            Ok(())
        }
    };

    readiness.mark_not_ready();
    if let Some(election) = leader {
        election.release().await;
    }

    result
}

fn spawn_http_servers(config: &OperatorConfig, readiness: Readiness) {
    let metrics_addr = config.metrics_bind_address;
    tokio::spawn(async move {
        if let Err(e) = serve("metrics", metrics_addr, metrics_routes()).await {
            error!("{e:#}");
        }
    });

    let probe_addr = config.health_probe_bind_address;
    tokio::spawn(async move {
        if let Err(e) = serve("health probe", probe_addr, probe_routes(readiness)).await {
            error!("{e:#}");
        }
    });
}

/// Resolves with an error when leadership is lost, or never without leader election.
async fn leadership_lost(leader: Option<&mut LeaderElection>) -> Result<()> {
    match leader {
        Some(election) => election.lost().await,
        None => std::future::pending().await,
    }
}

/// Wait for SIGTERM or Ctrl+C.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}

async fn run_controllers(ctx: Arc<Context>) -> Result<()> {
    tokio::select! {
        result = run_mission_controller(ctx.clone()) => {
            error!("CRITICAL: Mission controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Mission controller exited unexpectedly without error")
        }
        result = run_missionkey_controller(ctx.clone()) => {
            error!("CRITICAL: MissionKey controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("MissionKey controller exited unexpectedly without error")
        }
        result = run_virtualmachine_controller(ctx.clone()) => {
            error!("CRITICAL: VirtualMachine controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("VirtualMachine controller exited unexpectedly without error")
        }
        result = run_storagebuckets_controller(ctx.clone()) => {
            error!("CRITICAL: StorageBuckets controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("StorageBuckets controller exited unexpectedly without error")
        }
    }
}

/// Add an owned-object watch on a Crossplane kind, if its CRD is installed.
///
/// Watching a kind without a CRD would make the controller's watcher fail, so
/// missing provider families are skipped with a warning.
async fn owns_if_installed<K, Child>(
    controller: Controller<K>,
    client: &Client,
) -> Controller<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    Child: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let name = crd_name::<Child>();
    match crd_installed(client, &name).await {
        Ok(true) => {
            debug!("Watching owned {}", name);
            controller.owns(Api::<Child>::all(client.clone()), Config::default())
        }
        Ok(false) => {
            warn!(
                "CRD {} not installed, changes to owned {} objects will not trigger reconciles",
                name,
                Child::kind(&())
            );
            controller
        }
        Err(e) => {
            warn!("Failed to look up CRD {}: {}", name, e);
            controller
        }
    }
}

/// Run the `Mission` controller
async fn run_mission_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Mission controller");

    let client = ctx.client.clone();
    let controller = Controller::new(Api::<Mission>::all(client.clone()), Config::default());
    let controller = owns_if_installed::<_, GcpProviderConfig>(controller, &client).await;
    let controller = owns_if_installed::<_, AwsProviderConfig>(controller, &client).await;
    let controller = owns_if_installed::<_, AzureProviderConfig>(controller, &client).await;

    controller
        .run(reconcile_mission_wrapper, error_policy::<Mission>, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `MissionKey` controller
async fn run_missionkey_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting MissionKey controller");

    let client = ctx.client.clone();
    Controller::new(Api::<MissionKey>::all(client.clone()), Config::default())
        .owns(Api::<Secret>::all(client.clone()), Config::default())
        .owns(Api::<ServiceAccount>::all(client), Config::default())
        .run(reconcile_missionkey_wrapper, error_policy::<MissionKey>, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `VirtualMachine` controller
async fn run_virtualmachine_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting VirtualMachine controller");

    let client = ctx.client.clone();
    let controller =
        Controller::new(Api::<VirtualMachine>::all(client.clone()), Config::default());
    let controller = owns_if_installed::<_, GcpInstance>(controller, &client).await;
    let controller = owns_if_installed::<_, AwsInstance>(controller, &client).await;

    controller
        .run(
            reconcile_virtualmachine_wrapper,
            error_policy::<VirtualMachine>,
            ctx,
        )
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `StorageBuckets` controller
async fn run_storagebuckets_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting StorageBuckets controller");

    let client = ctx.client.clone();
    let controller =
        Controller::new(Api::<StorageBuckets>::all(client.clone()), Config::default());
    let controller = owns_if_installed::<_, GcpBucket>(controller, &client).await;
    let controller = owns_if_installed::<_, AwsBucket>(controller, &client).await;

    controller
        .run(
            reconcile_storagebuckets_wrapper,
            error_policy::<StorageBuckets>,
            ctx,
        )
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Requeue interval after a successful reconcile.
///
/// Resources that are not yet ready are checked more frequently.
fn requeue_after(ready: bool) -> Duration {
    if ready {
        Duration::from_secs(READY_REQUEUE_DURATION_SECS)
    } else {
        Duration::from_secs(NOT_READY_REQUEUE_DURATION_SECS)
    }
}

/// Turn a reconcile result into the controller's `Action`, recording metrics.
fn finish_reconcile<K: StatusResource>(
    kind: &str,
    resource: &K,
    started: Instant,
    result: Result<()>,
) -> Result<Action, ReconcileError> {
    match result {
        Ok(()) => {
            info!("Successfully reconciled {}: {}", kind, resource.name_any());
            record_reconciliation_success(kind, started.elapsed());

            let ready = is_ready(resource);
            record_reconciliation_requeue(kind, if ready { "ready" } else { "not_ready" });
            Ok(Action::requeue(requeue_after(ready)))
        }
        Err(e) => {
            error!("Failed to reconcile {} {}: {:#}", kind, resource.name_any(), e);
            record_reconciliation_error(kind, started.elapsed());
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `Mission`
async fn reconcile_mission_wrapper(
    mission: Arc<Mission>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_mission(ctx, (*mission).clone()).await;
    finish_reconcile(KIND_MISSION, mission.as_ref(), started, result)
}

/// Reconcile wrapper for `MissionKey`
async fn reconcile_missionkey_wrapper(
    key: Arc<MissionKey>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_missionkey(ctx, (*key).clone()).await;
    finish_reconcile(KIND_MISSION_KEY, key.as_ref(), started, result)
}

/// Reconcile wrapper for `VirtualMachine`
async fn reconcile_virtualmachine_wrapper(
    vm: Arc<VirtualMachine>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_virtualmachine(ctx, (*vm).clone()).await;
    finish_reconcile(KIND_VIRTUAL_MACHINE, vm.as_ref(), started, result)
}

/// Reconcile wrapper for `StorageBuckets`
async fn reconcile_storagebuckets_wrapper(
    bucket: Arc<StorageBuckets>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_storagebuckets(ctx, (*bucket).clone()).await;
    finish_reconcile(KIND_STORAGE_BUCKETS, bucket.as_ref(), started, result)
}

/// Requeue interval after a failed reconcile.
///
/// Errors a later install or API recovery can clear retry quickly. Invalid
/// specs wait longer, since editing the resource triggers a reconcile anyway.
fn error_requeue_after(err: &anyhow::Error) -> Duration {
    match err.downcast_ref::<MissionError>() {
        Some(e) if !e.is_transient() => Duration::from_secs(PERMANENT_ERROR_REQUEUE_DURATION_SECS),
        _ => Duration::from_secs(ERROR_REQUEUE_DURATION_SECS),
    }
}

/// Error policy for all controllers: record the failure and schedule a retry.
#[allow(clippy::needless_pass_by_value)]
fn error_policy<K: Resource<DynamicType = ()>>(
    resource: Arc<K>,
    err: &ReconcileError,
    _ctx: Arc<Context>,
) -> Action {
    let kind = K::kind(&());
    let reason = reason_for(&err.0);
    warn!(
        "Requeueing {} {} after error ({}): {:#}",
        kind,
        resource.name_any(),
        reason,
        err.0
    );
    record_error(&kind, reason);
    record_reconciliation_requeue(&kind, "error");
    Action::requeue(error_requeue_after(&err.0))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
