// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for Mission Control resources.
//!
//! Each reconciler converges one custom resource onto the Crossplane (or core
//! Kubernetes) objects it stands for and reports the result in a `Ready`
//! condition.
//!
//! # Reconciliation Architecture
//!
//! Mission Control follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via Kubernetes API
//! 2. **Reconcile** - Build the downstream objects the spec implies
//! 3. **Apply** - Create missing objects, update drifted ones ([`resources::reconcile_object`])
//! 4. **Status** - Report reconciliation results back to Kubernetes
//!
//! # Available Reconcilers
//!
//! ## Missions
//!
//! - [`reconcile_mission`] - Connects providers to Crossplane through `ProviderConfig`s
//! - [`reconcile_missionkey`] - Materializes credentials as a `Secret` and `ServiceAccount`
//!
//! ## Workloads
//!
//! - [`reconcile_virtualmachine`] - Provisions a compute `Instance`
//! - [`reconcile_storagebuckets`] - Provisions a storage `Bucket`
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use mission_control::reconcilers::reconcile_mission;
//! use mission_control::crd::Mission;
//! use mission_control::context::Context;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, mission: Mission) -> anyhow::Result<()> {
//!     reconcile_mission(ctx, mission).await?;
//!     Ok(())
//! }
//! ```

pub mod lookup;
pub mod mission;
pub mod missionkey;
pub mod resources;
pub mod status;
pub mod storagebuckets;
pub mod virtualmachine;

#[cfg(test)]
pub(crate) mod test_support;

pub use mission::reconcile_mission;
pub use missionkey::reconcile_missionkey;
pub use storagebuckets::reconcile_storagebuckets;
pub use virtualmachine::reconcile_virtualmachine;

/// Check if a resource's spec has changed by comparing generation with `observed_generation`.
///
/// Every reconcile converges the full state regardless, so this only decides
/// how loudly a reconcile is logged: spec changes at `info`, periodic resyncs
/// and owned-object events at `debug`.
///
/// # Arguments
///
/// * `current_generation` - The resource's current `metadata.generation`
/// * `observed_generation` - The controller's last `status.observedGeneration`
///
/// # Returns
///
/// * `true` - Spec changed since the last reconcile, or first reconcile
/// * `false` - Spec unchanged
///
/// # Kubernetes Generation Semantics
///
/// - **`metadata.generation`**: Incremented by the API server when spec changes
/// - **`status.observedGeneration`**: Set by the controller after processing a spec
/// - When `observedGeneration` is None: first reconciliation
#[must_use]
pub fn should_reconcile(current_generation: Option<i64>, observed_generation: Option<i64>) -> bool {
    match (current_generation, observed_generation) {
        (Some(current), Some(observed)) => current != observed,
        (Some(_), None) => true, // First reconciliation
        _ => false,              // No generation tracking available
    }
}
