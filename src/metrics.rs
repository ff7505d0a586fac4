// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Mission Control operator.
//!
//! All metrics carry the namespace prefix `mission_control_apis_io_`
//! (prometheus-safe version of "mission-control.apis.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Outcome and duration of every reconcile call
//! - **Downstream Object Metrics** - Crossplane and core objects created or updated
//! - **Crossplane Metrics** - Installation state of Crossplane provider packages
//! - **Error Metrics** - Failures by status reason
//! - **Leader Election Metrics** - Leadership state changes
//!
//! # Example
//!
//! ```rust,no_run
//! use mission_control::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("Mission", std::time::Duration::from_millis(120));
//! ```

use prometheus::core::Collector;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all Mission Control metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "mission_control_apis_io";

/// Global Prometheus metrics registry, exposed on the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Register a collector in [`METRICS_REGISTRY`] and hand it back.
///
/// Metric definitions are static, so a failure here is a programming error.
fn register<C: Collector + Clone + 'static>(collector: C) -> C {
    METRICS_REGISTRY
        .register(Box::new(collector.clone()))
        .unwrap();
    collector
}

fn name(suffix: &str) -> String {
    format!("{METRICS_NAMESPACE}_{suffix}")
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (`Mission`, `MissionKey`, ...)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("reconciliations_total"),
                "Total number of reconciliations by resource type and status",
            ),
            &["resource_type", "status"],
        )
        .unwrap(),
    )
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register(
        HistogramVec::new(
            HistogramOpts::new(
                name("reconciliation_duration_seconds"),
                "Duration of reconciliations in seconds by resource type",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["resource_type"],
        )
        .unwrap(),
    )
});

/// Total number of requeue operations
///
/// Labels:
/// - `reason`: `ready`, `not_ready` or `error`
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("requeues_total"),
                "Total number of requeue operations by resource type and reason",
            ),
            &["resource_type", "reason"],
        )
        .unwrap(),
    )
});

// ============================================================================
// Downstream Object Metrics
// ============================================================================

/// Downstream objects created, by kind (`GcpProviderConfig`, `Secret`, ...)
pub static RESOURCES_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("resources_created_total"),
                "Total number of downstream objects created by kind",
            ),
            &["resource_type"],
        )
        .unwrap(),
    )
});

/// Downstream objects updated because their managed spec drifted
pub static RESOURCES_UPDATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("resources_updated_total"),
                "Total number of downstream objects updated by kind",
            ),
            &["resource_type"],
        )
        .unwrap(),
    )
});

// ============================================================================
// Crossplane Metrics
// ============================================================================

/// Whether a Crossplane provider package reports `Installed=True` (1) or not (0)
pub static CROSSPLANE_PROVIDER_INSTALLED: LazyLock<GaugeVec> = LazyLock::new(|| {
    register(
        GaugeVec::new(
            Opts::new(
                name("crossplane_provider_installed"),
                "Crossplane provider package installation state (1 = installed)",
            ),
            &["package"],
        )
        .unwrap(),
    )
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by resource type and status reason
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("errors_total"),
                "Total number of errors by resource type and error category",
            ),
            &["resource_type", "error_type"],
        )
        .unwrap(),
    )
});

// ============================================================================
// Leader Election Metrics
// ============================================================================

/// Total number of leader election events (`acquired`, `lost`)
pub static LEADER_ELECTIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register(
        CounterVec::new(
            Opts::new(
                name("leader_elections_total"),
                "Total number of leader election events by status",
            ),
            &["status"],
        )
        .unwrap(),
    )
});

/// Current leader election status: 1 if leader, 0 if follower
pub static LEADER_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    register(
        GaugeVec::new(
            Opts::new(
                name("leader_status"),
                "Current leader election status (1 = leader, 0 = follower)",
            ),
            &["pod_name"],
        )
        .unwrap(),
    )
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
///
/// # Arguments
/// * `resource_type` - The kind of resource reconciled
/// * `reason` - `ready`, `not_ready` or `error`
pub fn record_reconciliation_requeue(resource_type: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "requeue"])
        .inc();
    REQUEUE_TOTAL
        .with_label_values(&[resource_type, reason])
        .inc();
}

/// Record creation of a downstream object
pub fn record_resource_created(resource_type: &str) {
    RESOURCES_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record an update of a downstream object
pub fn record_resource_updated(resource_type: &str) {
    RESOURCES_UPDATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record the observed installation state of a Crossplane provider package
pub fn record_provider_installed(package: &str, installed: bool) {
    CROSSPLANE_PROVIDER_INSTALLED
        .with_label_values(&[package])
        .set(if installed { 1.0 } else { 0.0 });
}

/// Record an error
///
/// # Arguments
/// * `resource_type` - The kind of resource where the error occurred
/// * `error_type` - Status reason of the error (e.g. `MissionNotFound`)
pub fn record_error(resource_type: &str, error_type: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_type])
        .inc();
}

/// Record leader election acquired
pub fn record_leader_elected(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL
        .with_label_values(&["acquired"])
        .inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(1.0);
}

/// Record leader election lost
pub fn record_leader_lost(pod_name: &str) {
    LEADER_ELECTIONS_TOTAL.with_label_values(&["lost"]).inc();
    LEADER_STATUS.with_label_values(&[pod_name]).set(0.0);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
