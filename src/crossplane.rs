// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed client-side views of the Crossplane resources Mission Control manages.
//!
//! These CRDs are owned by Crossplane and its Upbound provider families, so no
//! schema is generated for them. Only the fields the operator sets are modelled;
//! anything Crossplane late-initializes is dropped on deserialization and never
//! takes part in drift detection.
//!
//! All of these kinds are cluster-scoped.

use kube::{CustomResource, Resource};
use serde::{Deserialize, Serialize};

use crate::crd::Condition;
use crate::status_reasons::CONDITION_STATUS_UNKNOWN;

// ============================================================================
// Shared building blocks
// ============================================================================

/// Selects one key of a `Secret` in a given namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

/// Credentials block shared by every Upbound `ProviderConfig`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentials {
    /// Credential source; always `Secret` for configs created by the operator.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretKeySelector>,
}

/// Reference from a managed resource to the `ProviderConfig` it authenticates with.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigReference {
    pub name: String,
}

// ============================================================================
// pkg.crossplane.io
// ============================================================================

/// Crossplane provider package installation (`pkg.crossplane.io/v1 Provider`).
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "pkg.crossplane.io",
    version = "v1",
    kind = "Provider",
    root = "CrossplaneProvider",
    status = "CrossplaneProviderStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct CrossplaneProviderSpec {
    /// OCI reference of the provider package.
    #[serde(default)]
    pub package: String,
}

/// Conditions reported by the Crossplane package manager.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrossplaneProviderStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Status of the named condition on a Crossplane provider, or `Unknown` when absent.
#[must_use]
pub fn provider_condition_status(provider: &CrossplaneProvider, condition_type: &str) -> String {
    provider
        .status
        .as_ref()
        .and_then(|s| s.conditions.iter().find(|c| c.r#type == condition_type))
        .map_or_else(
            || CONDITION_STATUS_UNKNOWN.to_string(),
            |c| c.status.clone(),
        )
}

// ============================================================================
// ProviderConfigs
// ============================================================================

/// `gcp.upbound.io/v1beta1 ProviderConfig`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "gcp.upbound.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    root = "GcpProviderConfig",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct GcpProviderConfigSpec {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub credentials: ProviderCredentials,
}

/// `aws.upbound.io/v1beta1 ProviderConfig`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "aws.upbound.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    root = "AwsProviderConfig",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsProviderConfigSpec {
    pub credentials: ProviderCredentials,
}

/// `azure.upbound.io/v1beta1 ProviderConfig`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "azure.upbound.io",
    version = "v1beta1",
    kind = "ProviderConfig",
    root = "AzureProviderConfig",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AzureProviderConfigSpec {
    pub credentials: ProviderCredentials,
}

// ============================================================================
// Compute instances
// ============================================================================

/// `compute.gcp.upbound.io/v1beta1 Instance`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "compute.gcp.upbound.io",
    version = "v1beta1",
    kind = "Instance",
    root = "GcpInstance",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct GcpInstanceSpec {
    pub for_provider: GcpInstanceParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpInstanceParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub boot_disk: Vec<GcpBootDisk>,
    #[serde(default)]
    pub network_interface: Vec<GcpNetworkInterface>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpBootDisk {
    #[serde(default)]
    pub initialize_params: Vec<GcpInitializeParams>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpInitializeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpNetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// `ec2.aws.upbound.io/v1beta1 Instance`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "ec2.aws.upbound.io",
    version = "v1beta1",
    kind = "Instance",
    root = "AwsInstance",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsInstanceSpec {
    pub for_provider: AwsInstanceParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsInstanceParameters {
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami: Option<String>,
}

// ============================================================================
// Buckets
// ============================================================================

/// `storage.gcp.upbound.io/v1beta1 Bucket`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "storage.gcp.upbound.io",
    version = "v1beta1",
    kind = "Bucket",
    root = "GcpBucket",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct GcpBucketSpec {
    pub for_provider: GcpBucketParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpBucketParameters {
    pub location: String,
}

/// `s3.aws.upbound.io/v1beta1 Bucket`
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[kube(
    group = "s3.aws.upbound.io",
    version = "v1beta1",
    kind = "Bucket",
    root = "AwsBucket",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct AwsBucketSpec {
    pub for_provider: AwsBucketParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsBucketParameters {
    pub region: String,
}

/// Name of the CRD backing a resource type, e.g. `instances.compute.gcp.upbound.io`.
#[must_use]
pub fn crd_name<K>() -> String
where
    K: Resource<DynamicType = ()>,
{
    format!("{}.{}", K::plural(&()), K::group(&()))
}
