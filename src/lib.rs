// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Mission Control - Crossplane Mission Operator for Kubernetes
//!
//! Mission Control is a Kubernetes operator that turns a small set of
//! provider-agnostic resources into Crossplane objects.
//!
//! ## Overview
//!
//! - A [`crd::Mission`] lists cloud provider packages. For each one the operator
//!   confirms Crossplane and the provider package are installed and creates a
//!   `ProviderConfig` pointing at the package credentials.
//! - A [`crd::MissionKey`] holds those credentials and is materialized as a
//!   `Secret` and a `ServiceAccount`.
//! - [`crd::VirtualMachine`] and [`crd::StorageBuckets`] are workloads. Each
//!   names a mission and one of its keys; the key's package picks the provider
//!   and the Crossplane managed resource that gets created.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`crossplane`] - Typed views of the Crossplane kinds the operator writes
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`context`] - Shared client, event publisher and configuration
//! - [`leader`] - Lease-based leader election
//! - [`server`] - Metrics and health probe endpoints
//!
//! ## Example
//!
//! ```rust,no_run
//! use mission_control::crd::{
//!     StorageBucketsMissionRef, StorageBucketsParameters, StorageBucketsSpec,
//! };
//!
//! let spec = StorageBucketsSpec {
//!     mission_ref: StorageBucketsMissionRef {
//!         mission_name: "apollo".to_string(),
//!         mission_key: "gcp-key".to_string(),
//!     },
//!     for_provider: StorageBucketsParameters {
//!         name: "apollo-assets".to_string(),
//!         location: "US".to_string(),
//!     },
//! };
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod crossplane;
pub mod errors;
pub mod events;
pub mod labels;
pub mod leader;
pub mod metrics;
pub mod reconcilers;
pub mod server;
pub mod status_reasons;

#[cfg(test)]
mod crd_tests;
#[cfg(test)]
mod crossplane_tests;
#[cfg(test)]
mod errors_tests;
