// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for Mission Control.
//!
//! This module defines the Kubernetes Custom Resource Definitions used to describe
//! cloud infrastructure declaratively. Each resource is reconciled into one or more
//! Crossplane objects (see [`crate::crossplane`]).
//!
//! # Resource Types
//!
//! ## Missions
//!
//! - [`Mission`] - Connects a set of cloud providers to Crossplane via `ProviderConfig`s
//! - [`MissionKey`] - Holds the credentials a `Mission` package authenticates with
//!
//! ## Workloads
//!
//! - [`VirtualMachine`] - A compute instance provisioned through a `Mission`
//! - [`StorageBuckets`] - An object storage bucket provisioned through a `Mission`
//!
//! # Example: Creating a Mission
//!
//! ```rust,no_run
//! use mission_control::crd::{CredentialConfig, MissionSpec, PackageConfig, Provider};
//!
//! let spec = MissionSpec {
//!     packages: vec![PackageConfig {
//!         provider: Provider::Gcp,
//!         project_id: Some("my-gcp-project".to_string()),
//!         credentials: CredentialConfig {
//!             name: "gcp-key".to_string(),
//!             namespace: "crossplane-system".to_string(),
//!             key: "creds".to_string(),
//!         },
//!     }],
//! };
//! ```

use kube::CustomResource;
use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::MissionError;

/// Cloud provider a package, key or workload targets.
///
/// Serialized in lowercase. Uppercase spellings are accepted when reading
/// objects so older manifests keep deserializing, and the CRD schema lists
/// them too so the API server admits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Cloud Platform
    #[serde(alias = "GCP")]
    Gcp,
    /// Amazon Web Services
    #[serde(alias = "AWS")]
    Aws,
    /// Microsoft Azure
    #[serde(alias = "AZURE", alias = "Azure")]
    Azure,
}

impl Provider {
    /// Lowercase provider name, used in object names and labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Aws => "aws",
            Self::Azure => "azure",
        }
    }

    /// All supported providers, in declaration order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Gcp, Self::Aws, Self::Azure]
    }
}

/// Every spelling a `provider` field accepts. Must stay in line with the
/// `serde` aliases on [`Provider`].
pub const PROVIDER_SPELLINGS: [&str; 7] = ["gcp", "aws", "azure", "GCP", "AWS", "AZURE", "Azure"];

impl JsonSchema for Provider {
    fn schema_name() -> Cow<'static, str> {
        "Provider".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "enum": PROVIDER_SPELLINGS,
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = MissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MissionError::UnsupportedProvider {
                provider: s.to_string(),
                supported: Self::all().iter().map(ToString::to_string).collect(),
            })
    }
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. The operator maintains a single `Ready` condition.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

// ============================================================================
// Mission
// ============================================================================

/// Reference to the `MissionKey` holding a package's credentials.
///
/// The referenced `MissionKey` produces a `Secret` of the same name and namespace;
/// `key` selects the entry inside that `Secret` Crossplane reads.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialConfig {
    /// Name of the `MissionKey` (and its `Secret`).
    pub name: String,

    /// Namespace of the `MissionKey`.
    pub namespace: String,

    /// Data key inside the `Secret` holding the provider credentials.
    pub key: String,
}

/// One cloud provider connected by a `Mission`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageConfig {
    /// Cloud provider this package connects.
    pub provider: Provider,

    /// GCP project ID. Required when `provider` is `gcp`, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Credentials Crossplane uses to authenticate against the provider.
    pub credentials: CredentialConfig,
}

/// `Mission` connects cloud providers to Crossplane.
///
/// For every package the operator confirms the matching Crossplane provider is
/// installed, creates a `ProviderConfig` pointing at the package credentials,
/// and checks that the referenced `MissionKey` exists.
///
/// # Example
///
/// ```yaml
/// apiVersion: mission.mission-control.apis.io/v1alpha1
/// kind: Mission
/// metadata:
///   name: apollo
/// spec:
///   packages:
///     - provider: gcp
///       projectId: my-gcp-project
///       credentials:
///         name: gcp-key
///         namespace: crossplane-system
///         key: creds
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "mission.mission-control.apis.io",
    version = "v1alpha1",
    kind = "Mission",
    doc = "Mission connects one or more cloud providers to Crossplane. Each package produces a ProviderConfig named after the mission and provider.",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "MissionStatus")]
#[serde(rename_all = "camelCase")]
pub struct MissionSpec {
    /// Provider packages connected by this mission.
    #[schemars(length(min = 1))]
    pub packages: Vec<PackageConfig>,
}

/// Installation state of one Crossplane provider package.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionPackageStatus {
    /// Status of the Crossplane `Installed` condition (True/False/Unknown).
    #[serde(default)]
    pub installed: String,

    /// Status of the Crossplane `Healthy` condition (True/False/Unknown).
    #[serde(default)]
    pub healthy: String,
}

/// `Mission` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Crossplane provider package states keyed by package name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_status: BTreeMap<String, MissionPackageStatus>,
    /// Names of the `ProviderConfig`s managed for this mission.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_configs: Vec<String>,
}

// ============================================================================
// MissionKey
// ============================================================================

/// `MissionKey` stores provider credentials for a `Mission`.
///
/// The operator materializes the key as an `Opaque` `Secret` and a
/// `ServiceAccount`, both named after the key and owned by it.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "mission.mission-control.apis.io",
    version = "v1alpha1",
    kind = "MissionKey",
    namespaced,
    doc = "MissionKey holds cloud provider credentials. It is materialized as a Secret and ServiceAccount of the same name.",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[kube(status = "MissionKeyStatus")]
#[serde(rename_all = "camelCase")]
pub struct MissionKeySpec {
    /// Provider these credentials belong to.
    pub r#type: Provider,

    /// Credential material keyed by file name, copied verbatim into the `Secret`.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// `MissionKey` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionKeyStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

// ============================================================================
// VirtualMachine
// ============================================================================

/// Reference from a `VirtualMachine` to the mission and key it provisions with.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineMissionRef {
    /// Name of the `Mission`.
    pub mission_name: String,

    /// Name of the `MissionKey` referenced by one of the mission's packages.
    /// The matching package decides the provider.
    pub key_name: String,
}

/// Provider-agnostic instance parameters.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineParameters {
    /// Name of the cloud instance. Defaults to the `VirtualMachine` name.
    #[serde(default)]
    pub name: String,

    /// Zone the instance runs in (e.g. `us-central1-a`, `us-east-1a`).
    #[serde(rename = "location")]
    pub zone: String,

    /// Machine type (e.g. `e2-medium`, `t3.micro`).
    pub machine_type: String,

    /// Boot image (GCP image or AWS AMI).
    pub image: String,

    /// Network the instance attaches to. Unused on AWS.
    #[serde(default)]
    pub network: String,

    /// AWS region. Derived from the zone when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// `VirtualMachine` provisions a compute instance through a `Mission`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "compute.mission-control.apis.io",
    version = "v1alpha1",
    kind = "VirtualMachine",
    doc = "VirtualMachine provisions a compute instance on the provider selected by its mission key.",
    printcolumn = r#"{"name":"Mission","type":"string","jsonPath":".spec.missionRef.missionName"}"#,
    printcolumn = r#"{"name":"Provider","type":"string","jsonPath":".status.provider"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[kube(status = "VirtualMachineStatus")]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    pub mission_ref: VirtualMachineMissionRef,
    pub for_provider: VirtualMachineParameters,
}

/// `VirtualMachine` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
}

// ============================================================================
// StorageBuckets
// ============================================================================

/// Reference from `StorageBuckets` to the mission and key it provisions with.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageBucketsMissionRef {
    /// Name of the `Mission`.
    pub mission_name: String,

    /// Name of the `MissionKey` referenced by one of the mission's packages.
    pub mission_key: String,
}

/// Provider-agnostic bucket parameters.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageBucketsParameters {
    /// Name of the cloud bucket. Defaults to the `StorageBuckets` name.
    #[serde(default)]
    pub name: String,

    /// Bucket location: a GCP location (`US`, `europe-west1`) or an AWS region.
    pub location: String,
}

/// `StorageBuckets` provisions an object storage bucket through a `Mission`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "storage.mission-control.apis.io",
    version = "v1alpha1",
    kind = "StorageBuckets",
    plural = "storagebuckets",
    doc = "StorageBuckets provisions an object storage bucket on the provider selected by its mission key.",
    printcolumn = r#"{"name":"Mission","type":"string","jsonPath":".spec.missionRef.missionName"}"#,
    printcolumn = r#"{"name":"Provider","type":"string","jsonPath":".status.provider"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[kube(status = "StorageBucketsStatus")]
#[serde(rename_all = "camelCase")]
pub struct StorageBucketsSpec {
    pub mission_ref: StorageBucketsMissionRef,
    pub for_provider: StorageBucketsParameters,
}

/// `StorageBuckets` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageBucketsStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}
