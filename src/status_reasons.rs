// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for Mission Control resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status. Every resource carries a single `type: Ready` condition.
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "False"
//!       reason: ProviderNotInstalled
//!       message: "Crossplane provider package 'provider-aws-family' for provider aws is not installed"
//!   observedGeneration: 3
//! ```

// ============================================================================
// Condition Types and Statuses
// ============================================================================

/// The single encompassing condition type maintained on every resource.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition status `True`
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status `False`
pub const CONDITION_STATUS_FALSE: &str = "False";

/// Condition status `Unknown`, also used when Crossplane reports no condition.
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Success Reasons
// ============================================================================

/// Every downstream object exists and matches the spec.
pub const REASON_RECONCILED: &str = "Reconciled";

// ============================================================================
// Dependency Reasons
// ============================================================================

/// `providers.pkg.crossplane.io` is not installed in the cluster.
pub const REASON_CROSSPLANE_NOT_INSTALLED: &str = "CrossplaneNotInstalled";

/// The Crossplane `Provider` package for a mission package is missing.
pub const REASON_PROVIDER_NOT_INSTALLED: &str = "ProviderNotInstalled";

/// The referenced `Mission` does not exist.
pub const REASON_MISSION_NOT_FOUND: &str = "MissionNotFound";

/// The referenced `MissionKey` does not exist.
pub const REASON_MISSION_KEY_NOT_FOUND: &str = "MissionKeyNotFound";

/// No package of the referenced mission uses the requested key.
pub const REASON_MISSION_KEY_NOT_REFERENCED: &str = "MissionKeyNotReferenced";

// ============================================================================
// Spec Reasons
// ============================================================================

/// A mission package is incomplete (e.g. GCP without `projectId`).
pub const REASON_INVALID_PACKAGE: &str = "InvalidPackage";

/// The provider has no Crossplane mapping for this resource kind.
pub const REASON_UNSUPPORTED_PROVIDER: &str = "UnsupportedProvider";

// ============================================================================
// Failure Reasons
// ============================================================================

/// The owning resource has no uid yet.
pub const REASON_MISSING_OWNER_UID: &str = "MissingOwnerUid";

/// A Kubernetes API call failed.
pub const REASON_KUBERNETES_API_ERROR: &str = "KubernetesApiError";

/// Catch-all for errors without a more specific reason.
pub const REASON_RECONCILE_FAILED: &str = "ReconcileFailed";
