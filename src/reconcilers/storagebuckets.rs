// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `StorageBuckets` reconciliation logic.
//!
//! Like `VirtualMachine`, the package matching `spec.missionRef.missionKey`
//! selects the provider. `gcp` produces a `storage.gcp.upbound.io` `Bucket` in
//! `forProvider.location`; `aws` produces an `s3.aws.upbound.io` `Bucket` whose
//! region is the location. `azure` is rejected.

use anyhow::Result;
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::Context;
use crate::crd::{Provider, StorageBuckets};
use crate::crossplane::{
    AwsBucket, AwsBucketParameters, AwsBucketSpec, GcpBucket, GcpBucketParameters, GcpBucketSpec,
    ProviderConfigReference,
};
use crate::errors::MissionError;
use crate::events::{actions, reasons};
use crate::labels::{standard_labels, COMPONENT_BUCKET, MISSION_LABEL, PROVIDER_LABEL};
use crate::reconcilers::lookup::resolve_mission_target;
use crate::reconcilers::resources::{owned_metadata, reconcile_object, ApplyOutcome};
use crate::reconcilers::should_reconcile;
use crate::reconcilers::status::StatusUpdater;

/// Name of the cloud bucket: `forProvider.name`, or the `StorageBuckets` name.
#[must_use]
pub fn bucket_name(bucket: &StorageBuckets) -> String {
    let name = bucket.spec.for_provider.name.trim();
    if name.is_empty() {
        bucket.name_any()
    } else {
        name.to_string()
    }
}

fn bucket_labels(bucket: &StorageBuckets, provider: Provider) -> BTreeMap<String, String> {
    let mut labels = standard_labels(COMPONENT_BUCKET, &bucket.name_any());
    labels.insert(
        MISSION_LABEL.to_string(),
        bucket.spec.mission_ref.mission_name.clone(),
    );
    labels.insert(PROVIDER_LABEL.to_string(), provider.to_string());
    labels
}

fn provider_config_ref(name: &str) -> Option<ProviderConfigReference> {
    Some(ProviderConfigReference {
        name: name.to_string(),
    })
}

/// Build the GCS `Bucket` for `bucket`.
///
/// # Errors
///
/// Returns an error if the `StorageBuckets` has no uid.
pub fn build_gcp_bucket(
    bucket: &StorageBuckets,
    provider_config_name: &str,
) -> Result<GcpBucket, MissionError> {
    let name = bucket_name(bucket);
    let mut expected = GcpBucket::new(
        &name,
        GcpBucketSpec {
            for_provider: GcpBucketParameters {
                location: bucket.spec.for_provider.location.clone(),
            },
            provider_config_ref: provider_config_ref(provider_config_name),
        },
    );
    expected.metadata = owned_metadata(bucket, &name, None, bucket_labels(bucket, Provider::Gcp))?;
    Ok(expected)
}

/// Build the S3 `Bucket` for `bucket`.
///
/// # Errors
///
/// Returns an error if the `StorageBuckets` has no uid.
pub fn build_aws_bucket(
    bucket: &StorageBuckets,
    provider_config_name: &str,
) -> Result<AwsBucket, MissionError> {
    let name = bucket_name(bucket);
    let mut expected = AwsBucket::new(
        &name,
        AwsBucketSpec {
            for_provider: AwsBucketParameters {
                region: bucket.spec.for_provider.location.clone(),
            },
            provider_config_ref: provider_config_ref(provider_config_name),
        },
    );
    expected.metadata = owned_metadata(bucket, &name, None, bucket_labels(bucket, Provider::Aws))?;
    Ok(expected)
}

/// A bucket of whichever provider family the mission key selects.
#[derive(Clone, Debug)]
pub enum ExpectedBucket {
    Gcp(GcpBucket),
    Aws(AwsBucket),
}

impl ExpectedBucket {
    /// Create or update this bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails.
    pub async fn reconcile(&self, client: &Client) -> Result<ApplyOutcome> {
        match self {
            Self::Gcp(bucket) => reconcile_object(&Api::all(client.clone()), bucket).await,
            Self::Aws(bucket) => reconcile_object(&Api::all(client.clone()), bucket).await,
        }
    }
}

/// Build the bucket for `provider`.
///
/// # Errors
///
/// Returns [`MissionError::UnsupportedProvider`] for providers without a
/// storage mapping, or an error if the `StorageBuckets` has no uid.
pub fn build_bucket(
    bucket: &StorageBuckets,
    provider: Provider,
    provider_config_name: &str,
) -> Result<ExpectedBucket, MissionError> {
    match provider {
        Provider::Gcp => Ok(ExpectedBucket::Gcp(build_gcp_bucket(
            bucket,
            provider_config_name,
        )?)),
        Provider::Aws => Ok(ExpectedBucket::Aws(build_aws_bucket(
            bucket,
            provider_config_name,
        )?)),
        Provider::Azure => Err(MissionError::UnsupportedProvider {
            provider: provider.to_string(),
            supported: vec![Provider::Gcp.to_string(), Provider::Aws.to_string()],
        }),
    }
}

/// Reconciles a `StorageBuckets` resource.
///
/// # Errors
///
/// Returns an error if the mission target cannot be resolved, the provider has
/// no storage mapping, or any Kubernetes API call fails.
pub async fn reconcile_storagebuckets(ctx: Arc<Context>, bucket: StorageBuckets) -> Result<()> {
    let name = bucket.name_any();

    if should_reconcile(
        bucket.metadata.generation,
        bucket.status.as_ref().and_then(|s| s.observed_generation),
    ) {
        info!("Reconciling StorageBuckets: {name} (spec changed)");
    } else {
        debug!("Reconciling StorageBuckets: {name} (periodic resync)");
    }

    let mut status = StatusUpdater::new(&bucket);
    status.set_observed_generation(bucket.metadata.generation);

    let result = reconcile_bucket(&ctx, &bucket, &mut status).await;

    let api: Api<StorageBuckets> = Api::all(ctx.client.clone());
    status.finish(&api, result).await
}

async fn reconcile_bucket(
    ctx: &Context,
    bucket: &StorageBuckets,
    status: &mut StatusUpdater<StorageBuckets>,
) -> Result<String> {
    let object_ref = bucket.object_ref(&());
    let mission_ref = &bucket.spec.mission_ref;

    let target = resolve_mission_target(
        &ctx.client,
        &mission_ref.mission_name,
        &mission_ref.mission_key,
    )
    .await;
    let target = match target {
        Ok(target) => target,
        Err(e) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::MISSION_RESOLUTION_FAILED,
                    actions::VALIDATE,
                    e.to_string(),
                )
                .await;
            return Err(e.into());
        }
    };

    let provider = target.package.provider;
    let name = bucket_name(bucket);
    status.status_mut().provider = Some(provider);

    let expected = match build_bucket(bucket, provider, &target.provider_config_name) {
        Ok(expected) => expected,
        Err(e @ MissionError::UnsupportedProvider { .. }) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::UNSUPPORTED_PROVIDER,
                    actions::VALIDATE,
                    format!("StorageBuckets cannot be provisioned on {provider}: {e}"),
                )
                .await;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    match expected.reconcile(&ctx.client).await {
        Ok(ApplyOutcome::Created) => {
            ctx.events
                .normal(
                    &object_ref,
                    reasons::BUCKET_CREATED,
                    actions::CREATE,
                    format!("Created {provider} bucket {name}"),
                )
                .await;
        }
        Ok(ApplyOutcome::Updated) => {
            ctx.events
                .normal(
                    &object_ref,
                    reasons::BUCKET_UPDATED,
                    actions::UPDATE,
                    format!("Updated {provider} bucket {name}"),
                )
                .await;
        }
        Ok(ApplyOutcome::Unchanged) => {}
        Err(e) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::BUCKET_FAILED,
                    actions::RECONCILE,
                    format!("Could not reconcile {provider} bucket {name}: {e}"),
                )
                .await;
            return Err(e);
        }
    }

    status.status_mut().bucket_name = Some(name.clone());
    Ok(format!(
        "{provider} bucket {name} in {}",
        bucket.spec.for_provider.location
    ))
}

#[cfg(test)]
#[path = "storagebuckets_tests.rs"]
mod storagebuckets_tests;
