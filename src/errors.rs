// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain error types for Mission Control reconcilers.
//!
//! Reconcilers return `anyhow::Result`, but every failure the operator detects
//! itself is raised as a [`MissionError`] first so it can be mapped to a status
//! condition reason and a metrics label.

use thiserror::Error;

use crate::status_reasons::{
    REASON_CROSSPLANE_NOT_INSTALLED, REASON_INVALID_PACKAGE, REASON_KUBERNETES_API_ERROR,
    REASON_MISSING_OWNER_UID, REASON_MISSION_KEY_NOT_FOUND, REASON_MISSION_KEY_NOT_REFERENCED,
    REASON_MISSION_NOT_FOUND, REASON_PROVIDER_NOT_INSTALLED, REASON_UNSUPPORTED_PROVIDER,
};

/// Errors raised while reconciling Mission Control resources.
#[derive(Error, Debug)]
pub enum MissionError {
    /// The Crossplane core CRDs are missing from the cluster.
    #[error("Crossplane installation not found: CRD '{crd}' does not exist")]
    CrossplaneNotInstalled {
        /// Name of the CRD that was looked up
        crd: String,
    },

    /// The Crossplane provider package for a provider is not installed.
    #[error("Crossplane provider package '{package}' for provider {provider} is not installed")]
    ProviderNotInstalled {
        /// Provider the package serves
        provider: String,
        /// Crossplane `Provider` object name
        package: String,
    },

    /// A provider value outside the supported set, or a provider the resource
    /// kind has no Crossplane mapping for.
    #[error("Provider {provider} not supported, please use one of {supported:?}")]
    UnsupportedProvider {
        /// The rejected provider
        provider: String,
        /// Providers that are accepted here
        supported: Vec<String>,
    },

    /// A mission package is incomplete.
    #[error("Invalid package {index} ({provider}) in mission '{mission}': {reason}")]
    InvalidPackage {
        /// Mission name
        mission: String,
        /// Position of the package in `spec.packages`
        index: usize,
        /// Provider of the package
        provider: String,
        /// What is wrong with it
        reason: String,
    },

    /// A workload references a mission that does not exist.
    #[error("Mission '{mission}' not found")]
    MissionNotFound {
        /// Mission name
        mission: String,
    },

    /// A workload references a key none of the mission packages use.
    #[error("MissionKey '{key}' is not referenced by any package of mission '{mission}'")]
    MissionKeyNotReferenced {
        /// Mission name
        mission: String,
        /// Key name
        key: String,
    },

    /// The `MissionKey` a package references does not exist.
    #[error("MissionKey '{key}' not found in namespace '{namespace}'")]
    MissionKeyNotFound {
        /// Key name
        key: String,
        /// Namespace the key was expected in
        namespace: String,
    },

    /// An owner reference was requested for an object the API server has not persisted.
    #[error("{kind} '{name}' has no uid, cannot be used as an owner")]
    MissingOwnerUid {
        /// Owner kind
        kind: String,
        /// Owner name
        name: String,
    },

    /// Kubernetes API error
    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl MissionError {
    /// Returns the Kubernetes status reason code for this error.
    ///
    /// Used for the `Ready` condition reason and as the `error_type` metrics label.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::CrossplaneNotInstalled { .. } => REASON_CROSSPLANE_NOT_INSTALLED,
            Self::ProviderNotInstalled { .. } => REASON_PROVIDER_NOT_INSTALLED,
            Self::UnsupportedProvider { .. } => REASON_UNSUPPORTED_PROVIDER,
            Self::InvalidPackage { .. } => REASON_INVALID_PACKAGE,
            Self::MissionNotFound { .. } => REASON_MISSION_NOT_FOUND,
            Self::MissionKeyNotReferenced { .. } => REASON_MISSION_KEY_NOT_REFERENCED,
            Self::MissionKeyNotFound { .. } => REASON_MISSION_KEY_NOT_FOUND,
            Self::MissingOwnerUid { .. } => REASON_MISSING_OWNER_UID,
            Self::Kube(_) => REASON_KUBERNETES_API_ERROR,
        }
    }

    /// Returns true when waiting may resolve the error without a spec change.
    ///
    /// Missing dependencies can be installed later; invalid specs cannot fix themselves.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CrossplaneNotInstalled { .. }
            | Self::ProviderNotInstalled { .. }
            | Self::MissionNotFound { .. }
            | Self::MissionKeyNotFound { .. }
            | Self::MissingOwnerUid { .. }
            | Self::Kube(_) => true,
            Self::UnsupportedProvider { .. }
            | Self::InvalidPackage { .. }
            | Self::MissionKeyNotReferenced { .. } => false,
        }
    }
}

/// Map an `anyhow::Error` to a status reason, falling back to a generic reason
/// when the error did not originate as a [`MissionError`].
#[must_use]
pub fn reason_for(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<MissionError>()
        .map_or(crate::status_reasons::REASON_RECONCILE_FAILED, MissionError::status_reason)
}
