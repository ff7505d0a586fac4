// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Mission Control operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for `Mission` and `MissionKey`
pub const MISSION_API_GROUP: &str = "mission.mission-control.apis.io";

/// API group for `VirtualMachine`
pub const COMPUTE_API_GROUP: &str = "compute.mission-control.apis.io";

/// API group for `StorageBuckets`
pub const STORAGE_API_GROUP: &str = "storage.mission-control.apis.io";

/// API version for all Mission Control CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Kind name for `Mission` resource
pub const KIND_MISSION: &str = "Mission";

/// Kind name for `MissionKey` resource
pub const KIND_MISSION_KEY: &str = "MissionKey";

/// Kind name for `VirtualMachine` resource
pub const KIND_VIRTUAL_MACHINE: &str = "VirtualMachine";

/// Kind name for `StorageBuckets` resource
pub const KIND_STORAGE_BUCKETS: &str = "StorageBuckets";

// ============================================================================
// Crossplane Constants
// ============================================================================

/// CRD that must exist for Crossplane to be considered installed
pub const CROSSPLANE_PROVIDERS_CRD: &str = "providers.pkg.crossplane.io";

/// Default Crossplane provider package name for GCP
pub const DEFAULT_GCP_PROVIDER_PACKAGE: &str = "provider-gcp-family";

/// Default Crossplane provider package name for AWS
pub const DEFAULT_AWS_PROVIDER_PACKAGE: &str = "provider-aws-family";

/// Default Crossplane provider package name for Azure
pub const DEFAULT_AZURE_PROVIDER_PACKAGE: &str = "provider-azure-family";

/// Credential source used in every generated `ProviderConfig`
pub const CREDENTIALS_SOURCE_SECRET: &str = "Secret";

/// Crossplane `Provider` condition type reporting package installation
pub const CROSSPLANE_CONDITION_INSTALLED: &str = "Installed";

/// Crossplane `Provider` condition type reporting package health
pub const CROSSPLANE_CONDITION_HEALTHY: &str = "Healthy";

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors that may clear on their own (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration for errors only a spec change can fix (5 minutes)
pub const PERMANENT_ERROR_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue duration when a resource is Ready (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue duration when a resource is not yet Ready (30 seconds)
pub const NOT_READY_REQUEUE_DURATION_SECS: u64 = 30;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Lease name used for leader election
pub const LEADER_LEASE_NAME: &str = "mission-control-leader";

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Grace period before lease expiry at which the holder renews (2 seconds)
pub const DEFAULT_LEASE_GRACE_SECS: u64 = 2;

/// Namespace used for the lease when neither flag nor `POD_NAMESPACE` is set
pub const DEFAULT_LEASE_NAMESPACE: &str = "mission-control-system";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Thread name prefix for Tokio worker threads
pub const TOKIO_THREAD_NAME: &str = "mission-control";

/// Name reported by the event recorder and used as field manager
pub const CONTROLLER_NAME: &str = "mission-control";

// ============================================================================
// HTTP Server Constants
// ============================================================================

/// Default bind address for the Prometheus metrics HTTP server
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default bind address for the health probe HTTP server
pub const DEFAULT_HEALTH_PROBE_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for liveness probe endpoint
pub const HEALTHZ_PATH: &str = "/healthz";

/// Path for readiness probe endpoint
pub const READYZ_PATH: &str = "/readyz";
