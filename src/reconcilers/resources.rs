// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic create-or-update for downstream objects.
//!
//! Every reconciler builds the object it expects to exist and hands it to
//! [`reconcile_object`], which creates it when missing, updates it when the
//! managed part differs from what the API server holds, and otherwise leaves
//! it alone.
//!
//! What "the managed part" means and how an update is written differs per kind,
//! so each downstream type implements [`ManagedObject`]:
//!
//! - Crossplane resources compare `spec` and are updated with a JSON merge
//!   patch of `spec` guarded by `metadata.resourceVersion`, which keeps fields
//!   Crossplane late-initialized and fails with 409 on concurrent writes.
//!   Modelled fields the expected object leaves unset are patched to `null`.
//! - `Secret`s compare `data` and are replaced whole, so removed keys disappear.
//! - `ServiceAccount`s are only ever created.

use anyhow::{anyhow, Result};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::ByteString;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::crossplane::{
    AwsBucket, AwsInstance, AwsProviderConfig, AzureProviderConfig, GcpBucket, GcpInstance,
    GcpProviderConfig,
};
use crate::errors::MissionError;
use crate::metrics::{record_resource_created, record_resource_updated};

/// How [`reconcile_object`] writes an object whose managed part drifted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// JSON merge patch of the managed field, guarded by `resourceVersion`.
    MergeField(&'static str),
    /// Replace the whole object, carrying over `resourceVersion`.
    Replace,
    /// Never update once created.
    CreateOnly,
}

/// A downstream object kind the operator creates and keeps in sync.
pub trait ManagedObject:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The part of the object compared for drift.
    type Managed: PartialEq + Serialize;

    const STRATEGY: UpdateStrategy;

    fn managed(&self) -> Self::Managed;
}

macro_rules! impl_managed_spec {
    ($($kind:ty => $spec:ty),+ $(,)?) => {
        $(
            impl ManagedObject for $kind {
                type Managed = $spec;

                const STRATEGY: UpdateStrategy = UpdateStrategy::MergeField("spec");

                fn managed(&self) -> Self::Managed {
                    self.spec.clone()
                }
            }
        )+
    };
}

impl_managed_spec!(
    GcpProviderConfig => crate::crossplane::GcpProviderConfigSpec,
    AwsProviderConfig => crate::crossplane::AwsProviderConfigSpec,
    AzureProviderConfig => crate::crossplane::AzureProviderConfigSpec,
    GcpInstance => crate::crossplane::GcpInstanceSpec,
    AwsInstance => crate::crossplane::AwsInstanceSpec,
    GcpBucket => crate::crossplane::GcpBucketSpec,
    AwsBucket => crate::crossplane::AwsBucketSpec,
);

impl ManagedObject for Secret {
    type Managed = Option<BTreeMap<String, ByteString>>;

    const STRATEGY: UpdateStrategy = UpdateStrategy::Replace;

    fn managed(&self) -> Self::Managed {
        self.data.clone()
    }
}

impl ManagedObject for ServiceAccount {
    type Managed = ();

    const STRATEGY: UpdateStrategy = UpdateStrategy::CreateOnly;

    fn managed(&self) -> Self::Managed {}
}

/// What [`reconcile_object`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    Updated,
    Unchanged,
}

impl ApplyOutcome {
    /// Whether the API server was written to.
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Label identifying a kind in logs and metrics, e.g. `ProviderConfig.gcp.upbound.io`.
///
/// Core kinds have an empty group and are labelled by kind alone.
#[must_use]
pub fn kind_label<K: Resource<DynamicType = ()>>() -> String {
    let group = K::group(&());
    if group.is_empty() {
        K::kind(&()).to_string()
    } else {
        format!("{}.{group}", K::kind(&()))
    }
}

/// Create `expected` if it does not exist, update it if its managed part differs.
///
/// `api` decides the scope: pass `Api::all` for cluster-scoped kinds and
/// `Api::namespaced` for namespaced ones.
///
/// # Errors
///
/// Returns an error if `expected` has no name or any API call fails, including
/// 409 conflicts when the object changed between read and write.
pub async fn reconcile_object<K: ManagedObject>(api: &Api<K>, expected: &K) -> Result<ApplyOutcome> {
    let name = expected
        .meta()
        .name
        .clone()
        .ok_or_else(|| anyhow!("Resource must have a name"))?;
    let kind = kind_label::<K>();

    let Some(current) = api.get_opt(&name).await? else {
        debug!(kind = %kind, name = %name, "Resource does not exist, creating");
        api.create(&PostParams::default(), expected).await?;
        info!("Created {kind} {name}");
        record_resource_created(&kind);
        return Ok(ApplyOutcome::Created);
    };

    if current.managed() == expected.managed() {
        debug!(kind = %kind, name = %name, "Resource up to date");
        return Ok(ApplyOutcome::Unchanged);
    }

    match K::STRATEGY {
        UpdateStrategy::CreateOnly => {
            debug!(kind = %kind, name = %name, "Resource exists, never updated");
            return Ok(ApplyOutcome::Unchanged);
        }
        UpdateStrategy::MergeField(field) => {
            let mut patch = Map::new();
            patch.insert(
                "metadata".to_string(),
                serde_json::json!({ "resourceVersion": current.resource_version() }),
            );
            patch.insert(
                field.to_string(),
                merge_patch(
                    &serde_json::to_value(current.managed())?,
                    &serde_json::to_value(expected.managed())?,
                ),
            );
            api.patch(&name, &PatchParams::default(), &Patch::Merge(&Value::Object(patch)))
                .await?;
        }
        UpdateStrategy::Replace => {
            let mut desired = expected.clone();
            desired.meta_mut().resource_version = current.resource_version();
            api.replace(&name, &PostParams::default(), &desired).await?;
        }
    }

    info!("Updated {kind} {name} to match expected state");
    record_resource_updated(&kind);
    Ok(ApplyOutcome::Updated)
}

/// JSON merge patch (RFC 7386) turning `current` into `expected`.
///
/// Object keys present in `current` but missing from `expected` are set to
/// `null` so the API server removes them. Arrays and scalars are written whole.
#[must_use]
pub fn merge_patch(current: &Value, expected: &Value) -> Value {
    let (Value::Object(current), Value::Object(expected)) = (current, expected) else {
        return expected.clone();
    };

    let mut patch: Map<String, Value> = expected
        .iter()
        .map(|(key, value)| {
            let value = match current.get(key) {
                Some(existing) => merge_patch(existing, value),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect();
    for key in current.keys() {
        if !expected.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }
    Value::Object(patch)
}

/// Controller owner reference pointing at `owner`.
///
/// # Errors
///
/// Returns [`MissionError::MissingOwnerUid`] if the owner has not been persisted.
pub fn owner_reference<O: Resource<DynamicType = ()>>(owner: &O) -> Result<OwnerReference, MissionError> {
    let uid = owner
        .meta()
        .uid
        .clone()
        .ok_or_else(|| MissionError::MissingOwnerUid {
            kind: O::kind(&()).to_string(),
            name: owner.name_any(),
        })?;

    Ok(OwnerReference {
        api_version: O::api_version(&()).to_string(),
        kind: O::kind(&()).to_string(),
        name: owner.name_any(),
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

/// Metadata for a downstream object owned by `owner`.
pub fn owned_metadata<O: Resource<DynamicType = ()>>(
    owner: &O,
    name: &str,
    namespace: Option<&str>,
    labels: BTreeMap<String, String>,
) -> Result<ObjectMeta, MissionError> {
    Ok(ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(ToString::to_string),
        labels: Some(labels),
        owner_references: Some(vec![owner_reference(owner)?]),
        ..Default::default()
    })
}

/// Whether a CRD named `name` (e.g. `providers.pkg.crossplane.io`) is installed.
///
/// # Errors
///
/// Returns an error if the lookup fails for a reason other than not-found.
pub async fn crd_installed(client: &Client, name: &str) -> Result<bool> {
    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    Ok(api.get_opt(name).await?.is_some())
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
