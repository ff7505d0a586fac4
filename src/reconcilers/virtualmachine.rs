// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `VirtualMachine` reconciliation logic.
//!
//! The mission package whose credentials match `spec.missionRef.keyName`
//! selects the provider:
//!
//! - `gcp` produces a `compute.gcp.upbound.io` `Instance`
//! - `aws` produces an `ec2.aws.upbound.io` `Instance`
//! - `azure` has no compute mapping and is rejected
//!
//! The instance authenticates through the `ProviderConfig` generated for that
//! package and is owned by the `VirtualMachine`.

use anyhow::Result;
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::Context;
use crate::crd::{Provider, VirtualMachine};
use crate::crossplane::{
    AwsInstance, AwsInstanceParameters, AwsInstanceSpec, GcpBootDisk, GcpInitializeParams,
    GcpInstance, GcpInstanceParameters, GcpInstanceSpec, GcpNetworkInterface,
    ProviderConfigReference,
};
use crate::errors::MissionError;
use crate::events::{actions, reasons};
use crate::labels::{standard_labels, COMPONENT_INSTANCE, MISSION_LABEL, PROVIDER_LABEL};
use crate::reconcilers::lookup::resolve_mission_target;
use crate::reconcilers::resources::{owned_metadata, reconcile_object, ApplyOutcome};
use crate::reconcilers::should_reconcile;
use crate::reconcilers::status::StatusUpdater;

/// GCP network used when `forProvider.network` is empty.
const DEFAULT_GCP_NETWORK: &str = "default";

/// Name of the cloud instance: `forProvider.name`, or the `VirtualMachine` name.
#[must_use]
pub fn instance_name(vm: &VirtualMachine) -> String {
    let name = vm.spec.for_provider.name.trim();
    if name.is_empty() {
        vm.name_any()
    } else {
        name.to_string()
    }
}

/// AWS region of an availability zone, e.g. `us-east-1a` -> `us-east-1`.
///
/// The region ends at the first dash-separated part starting with a digit, so
/// GovCloud (`us-gov-west-1a`), Local Zones (`us-west-2-lax-1a`) and Wavelength
/// Zones (`us-east-1-wl1-bos-wlz-1`) resolve to their parent region. Zones with
/// no such part are returned unchanged.
#[must_use]
pub fn aws_region_from_zone(zone: &str) -> String {
    let parts: Vec<&str> = zone.split('-').collect();
    let Some(index) = parts
        .iter()
        .position(|part| part.starts_with(|c: char| c.is_ascii_digit()))
    else {
        return zone.to_string();
    };

    let number = parts[index].trim_end_matches(|c: char| c.is_ascii_lowercase());
    let mut region = parts[..index].to_vec();
    region.push(number);
    region.join("-")
}

fn instance_labels(vm: &VirtualMachine, provider: Provider) -> BTreeMap<String, String> {
    let mut labels = standard_labels(COMPONENT_INSTANCE, &vm.name_any());
    labels.insert(
        MISSION_LABEL.to_string(),
        vm.spec.mission_ref.mission_name.clone(),
    );
    labels.insert(PROVIDER_LABEL.to_string(), provider.to_string());
    labels
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Build the GCP `Instance` for `vm`.
///
/// # Errors
///
/// Returns an error if the `VirtualMachine` has no uid.
pub fn build_gcp_instance(
    vm: &VirtualMachine,
    provider_config_name: &str,
) -> Result<GcpInstance, MissionError> {
    let params = &vm.spec.for_provider;
    let name = instance_name(vm);

    let mut instance = GcpInstance::new(
        &name,
        GcpInstanceSpec {
            for_provider: GcpInstanceParameters {
                zone: non_empty(&params.zone),
                machine_type: non_empty(&params.machine_type),
                boot_disk: vec![GcpBootDisk {
                    initialize_params: vec![GcpInitializeParams {
                        image: non_empty(&params.image),
                    }],
                }],
                network_interface: vec![GcpNetworkInterface {
                    network: Some(
                        non_empty(&params.network)
                            .unwrap_or_else(|| DEFAULT_GCP_NETWORK.to_string()),
                    ),
                }],
            },
            provider_config_ref: Some(ProviderConfigReference {
                name: provider_config_name.to_string(),
            }),
        },
    );
    instance.metadata = owned_metadata(vm, &name, None, instance_labels(vm, Provider::Gcp))?;
    Ok(instance)
}

/// Build the AWS EC2 `Instance` for `vm`.
///
/// The region comes from `forProvider.region`, or is derived from the zone.
///
/// # Errors
///
/// Returns an error if the `VirtualMachine` has no uid.
pub fn build_aws_instance(
    vm: &VirtualMachine,
    provider_config_name: &str,
) -> Result<AwsInstance, MissionError> {
    let params = &vm.spec.for_provider;
    let name = instance_name(vm);
    let region = params
        .region
        .as_deref()
        .and_then(non_empty)
        .unwrap_or_else(|| aws_region_from_zone(params.zone.trim()));

    let mut instance = AwsInstance::new(
        &name,
        AwsInstanceSpec {
            for_provider: AwsInstanceParameters {
                region,
                availability_zone: non_empty(&params.zone),
                instance_type: non_empty(&params.machine_type),
                ami: non_empty(&params.image),
            },
            provider_config_ref: Some(ProviderConfigReference {
                name: provider_config_name.to_string(),
            }),
        },
    );
    instance.metadata = owned_metadata(vm, &name, None, instance_labels(vm, Provider::Aws))?;
    Ok(instance)
}

/// A compute instance of whichever provider family the mission key selects.
#[derive(Clone, Debug)]
pub enum ExpectedInstance {
    Gcp(GcpInstance),
    Aws(AwsInstance),
}

impl ExpectedInstance {
    /// Create or update this instance.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails.
    pub async fn reconcile(&self, client: &Client) -> Result<ApplyOutcome> {
        match self {
            Self::Gcp(instance) => reconcile_object(&Api::all(client.clone()), instance).await,
            Self::Aws(instance) => reconcile_object(&Api::all(client.clone()), instance).await,
        }
    }
}

/// Build the instance for `provider`.
///
/// # Errors
///
/// Returns [`MissionError::UnsupportedProvider`] for providers without a
/// compute mapping, or an error if the `VirtualMachine` has no uid.
pub fn build_instance(
    vm: &VirtualMachine,
    provider: Provider,
    provider_config_name: &str,
) -> Result<ExpectedInstance, MissionError> {
    match provider {
        Provider::Gcp => Ok(ExpectedInstance::Gcp(build_gcp_instance(
            vm,
            provider_config_name,
        )?)),
        Provider::Aws => Ok(ExpectedInstance::Aws(build_aws_instance(
            vm,
            provider_config_name,
        )?)),
        Provider::Azure => Err(MissionError::UnsupportedProvider {
            provider: provider.to_string(),
            supported: vec![Provider::Gcp.to_string(), Provider::Aws.to_string()],
        }),
    }
}

/// Reconciles a `VirtualMachine` resource.
///
/// # Errors
///
/// Returns an error if the mission target cannot be resolved, the provider has
/// no compute mapping, or any Kubernetes API call fails.
pub async fn reconcile_virtualmachine(ctx: Arc<Context>, vm: VirtualMachine) -> Result<()> {
    let name = vm.name_any();

    if should_reconcile(
        vm.metadata.generation,
        vm.status.as_ref().and_then(|s| s.observed_generation),
    ) {
        info!("Reconciling VirtualMachine: {name} (spec changed)");
    } else {
        debug!("Reconciling VirtualMachine: {name} (periodic resync)");
    }

    let mut status = StatusUpdater::new(&vm);
    status.set_observed_generation(vm.metadata.generation);

    let result = reconcile_instance(&ctx, &vm, &mut status).await;

    let api: Api<VirtualMachine> = Api::all(ctx.client.clone());
    status.finish(&api, result).await
}

async fn reconcile_instance(
    ctx: &Context,
    vm: &VirtualMachine,
    status: &mut StatusUpdater<VirtualMachine>,
) -> Result<String> {
    let object_ref = vm.object_ref(&());
    let mission_ref = &vm.spec.mission_ref;

    let target = match resolve_mission_target(
        &ctx.client,
        &mission_ref.mission_name,
        &mission_ref.key_name,
    )
    .await
    {
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
    let name = instance_name(vm);
    status.status_mut().provider = Some(provider);

    let expected = match build_instance(vm, provider, &target.provider_config_name) {
        Ok(expected) => expected,
        Err(e @ MissionError::UnsupportedProvider { .. }) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::UNSUPPORTED_PROVIDER,
                    actions::VALIDATE,
                    format!("VirtualMachines cannot be provisioned on {provider}: {e}"),
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
                    reasons::INSTANCE_CREATED,
                    actions::CREATE,
                    format!("Created {provider} instance {name}"),
                )
                .await;
        }
        Ok(ApplyOutcome::Updated) => {
            ctx.events
                .normal(
                    &object_ref,
                    reasons::INSTANCE_UPDATED,
                    actions::UPDATE,
                    format!("Updated {provider} instance {name}"),
                )
                .await;
        }
        Ok(ApplyOutcome::Unchanged) => {}
        Err(e) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::INSTANCE_FAILED,
                    actions::RECONCILE,
                    format!("Could not reconcile {provider} instance {name}: {e}"),
                )
                .await;
            return Err(e);
        }
    }

    status.status_mut().instance_name = Some(name.clone());
    Ok(format!(
        "{provider} instance {name} uses ProviderConfig {}",
        target.provider_config_name
    ))
}

#[cfg(test)]
#[path = "virtualmachine_tests.rs"]
mod virtualmachine_tests;
