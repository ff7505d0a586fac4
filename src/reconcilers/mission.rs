// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Mission` reconciliation logic.
//!
//! A `Mission` connects cloud providers to Crossplane. Reconciling one:
//!
//! 1. Confirms Crossplane itself is installed
//! 2. Validates every package
//! 3. Confirms the Crossplane provider package for every provider is installed
//!    and records its `Installed`/`Healthy` state in `status.packageStatus`
//! 4. Creates or updates one `ProviderConfig` per package
//! 5. Checks that every referenced `MissionKey` exists
//!
//! Missing `MissionKey`s only produce a Warning event. The key may be applied
//! after the mission, and the `ProviderConfig` starts working once its `Secret`
//! exists.

use anyhow::Result;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::{Api, Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::{
    CREDENTIALS_SOURCE_SECRET, CROSSPLANE_CONDITION_HEALTHY, CROSSPLANE_CONDITION_INSTALLED,
    CROSSPLANE_PROVIDERS_CRD,
};
use crate::context::Context;
use crate::crd::{Mission, MissionPackageStatus, PackageConfig, Provider};
use crate::crossplane::{
    provider_condition_status, AwsProviderConfig, AwsProviderConfigSpec, AzureProviderConfig,
    AzureProviderConfigSpec, CrossplaneProvider, GcpProviderConfig, GcpProviderConfigSpec,
    ProviderCredentials, SecretKeySelector,
};
use crate::errors::MissionError;
use crate::events::{actions, reasons};
use crate::labels::{
    standard_labels, COMPONENT_PROVIDER_CONFIG, MISSION_LABEL, PROVIDER_LABEL,
};
use crate::metrics::record_provider_installed;
use crate::reconcilers::resources::{owned_metadata, reconcile_object, ApplyOutcome};
use crate::reconcilers::should_reconcile;
use crate::reconcilers::status::StatusUpdater;
use crate::status_reasons::CONDITION_STATUS_TRUE;

/// Name of the `ProviderConfig` for the `occurrence`-th package of `provider`
/// in a mission (0-based).
///
/// The first occurrence is `{mission}-{provider}`; later ones get a numeric
/// suffix so duplicate providers never collide.
#[must_use]
pub fn provider_config_name(mission_name: &str, provider: Provider, occurrence: usize) -> String {
    if occurrence == 0 {
        format!("{mission_name}-{provider}")
    } else {
        format!("{mission_name}-{provider}-{occurrence}")
    }
}

/// `ProviderConfig` names for every package of `mission`, in package order.
#[must_use]
pub fn provider_config_names(mission: &Mission) -> Vec<String> {
    let mission_name = mission.name_any();
    let mut seen: BTreeMap<Provider, usize> = BTreeMap::new();

    mission
        .spec
        .packages
        .iter()
        .map(|pkg| {
            let occurrence = seen.entry(pkg.provider).or_insert(0);
            let name = provider_config_name(&mission_name, pkg.provider, *occurrence);
            *occurrence += 1;
            name
        })
        .collect()
}

/// Check a package carries everything its `ProviderConfig` needs.
///
/// # Errors
///
/// Returns [`MissionError::InvalidPackage`] describing the first problem found.
pub fn validate_package(
    mission_name: &str,
    index: usize,
    package: &PackageConfig,
) -> Result<(), MissionError> {
    let invalid = |reason: &str| MissionError::InvalidPackage {
        mission: mission_name.to_string(),
        index,
        provider: package.provider.to_string(),
        reason: reason.to_string(),
    };

    if package.provider == Provider::Gcp
        && package
            .project_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
    {
        return Err(invalid("projectId is required for gcp packages"));
    }

    let credentials = &package.credentials;
    if credentials.name.trim().is_empty() {
        return Err(invalid("credentials.name must not be empty"));
    }
    if credentials.namespace.trim().is_empty() {
        return Err(invalid("credentials.namespace must not be empty"));
    }
    if credentials.key.trim().is_empty() {
        return Err(invalid("credentials.key must not be empty"));
    }

    Ok(())
}

/// Credentials block pointing at the `Secret` materialized from the package's `MissionKey`.
fn secret_credentials(package: &PackageConfig) -> ProviderCredentials {
    ProviderCredentials {
        source: CREDENTIALS_SOURCE_SECRET.to_string(),
        secret_ref: Some(SecretKeySelector {
            name: package.credentials.name.clone(),
            namespace: package.credentials.namespace.clone(),
            key: package.credentials.key.clone(),
        }),
    }
}

fn provider_config_labels(mission: &Mission, provider: Provider) -> BTreeMap<String, String> {
    let mission_name = mission.name_any();
    let mut labels = standard_labels(COMPONENT_PROVIDER_CONFIG, &mission_name);
    labels.insert(MISSION_LABEL.to_string(), mission_name);
    labels.insert(PROVIDER_LABEL.to_string(), provider.to_string());
    labels
}

/// Build the `gcp.upbound.io` `ProviderConfig` for a gcp package.
///
/// # Errors
///
/// Returns an error if the mission has no uid.
pub fn build_gcp_provider_config(
    mission: &Mission,
    package: &PackageConfig,
    name: &str,
) -> Result<GcpProviderConfig, MissionError> {
    let mut config = GcpProviderConfig::new(
        name,
        GcpProviderConfigSpec {
            project_id: package.project_id.clone().unwrap_or_default(),
            credentials: secret_credentials(package),
        },
    );
    config.metadata = owned_metadata(
        mission,
        name,
        None,
        provider_config_labels(mission, Provider::Gcp),
    )?;
    Ok(config)
}

/// Build the `aws.upbound.io` `ProviderConfig` for an aws package.
///
/// # Errors
///
/// Returns an error if the mission has no uid.
pub fn build_aws_provider_config(
    mission: &Mission,
    package: &PackageConfig,
    name: &str,
) -> Result<AwsProviderConfig, MissionError> {
    let mut config = AwsProviderConfig::new(
        name,
        AwsProviderConfigSpec {
            credentials: secret_credentials(package),
        },
    );
    config.metadata = owned_metadata(
        mission,
        name,
        None,
        provider_config_labels(mission, Provider::Aws),
    )?;
    Ok(config)
}

/// Build the `azure.upbound.io` `ProviderConfig` for an azure package.
///
/// # Errors
///
/// Returns an error if the mission has no uid.
pub fn build_azure_provider_config(
    mission: &Mission,
    package: &PackageConfig,
    name: &str,
) -> Result<AzureProviderConfig, MissionError> {
    let mut config = AzureProviderConfig::new(
        name,
        AzureProviderConfigSpec {
            credentials: secret_credentials(package),
        },
    );
    config.metadata = owned_metadata(
        mission,
        name,
        None,
        provider_config_labels(mission, Provider::Azure),
    )?;
    Ok(config)
}

/// A `ProviderConfig` of whichever provider family a package targets.
#[derive(Clone, Debug)]
pub enum ExpectedProviderConfig {
    Gcp(GcpProviderConfig),
    Aws(AwsProviderConfig),
    Azure(AzureProviderConfig),
}

impl ExpectedProviderConfig {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Gcp(config) => config.name_any(),
            Self::Aws(config) => config.name_any(),
            Self::Azure(config) => config.name_any(),
        }
    }

    /// Create or update this `ProviderConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if any API call fails.
    pub async fn reconcile(&self, client: &Client) -> Result<ApplyOutcome> {
        match self {
            Self::Gcp(config) => reconcile_object(&Api::all(client.clone()), config).await,
            Self::Aws(config) => reconcile_object(&Api::all(client.clone()), config).await,
            Self::Azure(config) => reconcile_object(&Api::all(client.clone()), config).await,
        }
    }
}

/// Build the `ProviderConfig` for `package`, dispatching on its provider.
///
/// # Errors
///
/// Returns an error if the mission has no uid.
pub fn build_provider_config(
    mission: &Mission,
    package: &PackageConfig,
    name: &str,
) -> Result<ExpectedProviderConfig, MissionError> {
    Ok(match package.provider {
        Provider::Gcp => {
            ExpectedProviderConfig::Gcp(build_gcp_provider_config(mission, package, name)?)
        }
        Provider::Aws => {
            ExpectedProviderConfig::Aws(build_aws_provider_config(mission, package, name)?)
        }
        Provider::Azure => {
            ExpectedProviderConfig::Azure(build_azure_provider_config(mission, package, name)?)
        }
    })
}

/// Look up the Crossplane provider package serving `provider`.
///
/// # Errors
///
/// Returns [`MissionError::ProviderNotInstalled`] if the package object does not exist.
async fn confirm_provider_package(
    ctx: &Context,
    provider: Provider,
) -> Result<(String, MissionPackageStatus), MissionError> {
    let package = ctx.config.provider_package(provider).to_string();
    let api: Api<CrossplaneProvider> = Api::all(ctx.client.clone());

    let Some(installed) = api.get_opt(&package).await? else {
        record_provider_installed(&package, false);
        return Err(MissionError::ProviderNotInstalled {
            provider: provider.to_string(),
            package,
        });
    };

    let status = MissionPackageStatus {
        installed: provider_condition_status(&installed, CROSSPLANE_CONDITION_INSTALLED),
        healthy: provider_condition_status(&installed, CROSSPLANE_CONDITION_HEALTHY),
    };
    record_provider_installed(&package, status.installed == CONDITION_STATUS_TRUE);
    debug!(
        package = %package,
        installed = %status.installed,
        healthy = %status.healthy,
        "Found Crossplane provider package"
    );

    Ok((package, status))
}

/// Emit `MissionKeyLinked` or `MissionKeyNotFound` for every package.
///
/// Returns the `namespace/name` of every missing key.
async fn confirm_mission_keys(
    ctx: &Context,
    mission: &Mission,
    object_ref: &ObjectReference,
) -> Result<Vec<String>> {
    let mut missing = Vec::new();

    for package in &mission.spec.packages {
        let credentials = &package.credentials;
        match super::lookup::get_mission_key(&ctx.client, package).await {
            Ok(_) => {
                ctx.events
                    .normal(
                        object_ref,
                        reasons::MISSION_KEY_LINKED,
                        actions::VALIDATE,
                        format!(
                            "MissionKey \"{}\" correctly linked in Namespace \"{}\".",
                            credentials.name, credentials.namespace
                        ),
                    )
                    .await;
            }
            Err(MissionError::MissionKeyNotFound { key, namespace }) => {
                warn!(
                    "Mission {} references MissionKey {namespace}/{key} which does not exist",
                    mission.name_any()
                );
                ctx.events
                    .warning(
                        object_ref,
                        reasons::MISSION_KEY_NOT_FOUND,
                        actions::VALIDATE,
                        format!(
                            "Provider {}: Please ensure that MissionKey \"{key}\" exists in namespace \"{namespace}\".",
                            package.provider
                        ),
                    )
                    .await;
                missing.push(format!("{namespace}/{key}"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(missing)
}

/// Reconciles a `Mission` resource.
///
/// # Errors
///
/// Returns an error if Crossplane or a provider package is missing, a package
/// is invalid, or any Kubernetes API call fails. The `Ready` condition carries
/// the failure either way.
pub async fn reconcile_mission(ctx: Arc<Context>, mission: Mission) -> Result<()> {
    let name = mission.name_any();

    if should_reconcile(
        mission.metadata.generation,
        mission.status.as_ref().and_then(|s| s.observed_generation),
    ) {
        info!("Reconciling Mission: {name} (spec changed)");
    } else {
        debug!("Reconciling Mission: {name} (periodic resync)");
    }

    let mut status = StatusUpdater::new(&mission);
    status.set_observed_generation(mission.metadata.generation);

    let result = reconcile_mission_packages(&ctx, &mission, &mut status).await;

    let api: Api<Mission> = Api::all(ctx.client.clone());
    status.finish(&api, result).await
}

async fn reconcile_mission_packages(
    ctx: &Context,
    mission: &Mission,
    status: &mut StatusUpdater<Mission>,
) -> Result<String> {
    let name = mission.name_any();
    let object_ref = mission.object_ref(&());

    if !super::resources::crd_installed(&ctx.client, CROSSPLANE_PROVIDERS_CRD).await? {
        ctx.events
            .warning(
                &object_ref,
                reasons::CROSSPLANE_NOT_FOUND,
                actions::VALIDATE,
                "Crossplane installation not found".to_string(),
            )
            .await;
        return Err(MissionError::CrossplaneNotInstalled {
            crd: CROSSPLANE_PROVIDERS_CRD.to_string(),
        }
        .into());
    }

    for (index, package) in mission.spec.packages.iter().enumerate() {
        if let Err(e) = validate_package(&name, index, package) {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::INVALID_PACKAGE,
                    actions::VALIDATE,
                    e.to_string(),
                )
                .await;
            return Err(e.into());
        }
    }

    let mut providers: Vec<Provider> = mission.spec.packages.iter().map(|p| p.provider).collect();
    providers.sort_unstable();
    providers.dedup();

    let mut package_status = BTreeMap::new();
    for provider in providers {
        match confirm_provider_package(ctx, provider).await {
            Ok((package, state)) => {
                package_status.insert(package, state);
            }
            Err(e) => {
                ctx.events
                    .warning(
                        &object_ref,
                        reasons::PROVIDER_NOT_INSTALLED,
                        actions::VALIDATE,
                        e.to_string(),
                    )
                    .await;
                return Err(e.into());
            }
        }
    }
    status.status_mut().package_status = package_status;

    ctx.events
        .normal(
            &object_ref,
            reasons::CONNECTED,
            actions::VALIDATE,
            "Mission correctly connected to Crossplane".to_string(),
        )
        .await;

    let names = provider_config_names(mission);
    let mut changed = Vec::new();
    for (package, config_name) in mission.spec.packages.iter().zip(&names) {
        let outcome = match build_provider_config(mission, package, config_name) {
            Ok(expected) => expected.reconcile(&ctx.client).await,
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(outcome) if outcome.changed() => changed.push(config_name.clone()),
            Ok(_) => {}
            Err(e) => {
                ctx.events
                    .warning(
                        &object_ref,
                        reasons::PROVIDER_CONFIG_FAILED,
                        actions::RECONCILE,
                        format!("Could not correctly create ProviderConfig {config_name}: {e}"),
                    )
                    .await;
                return Err(e);
            }
        }
    }

    if !changed.is_empty() {
        ctx.events
            .normal(
                &object_ref,
                reasons::PROVIDER_CONFIG_READY,
                actions::RECONCILE,
                format!("ProviderConfig correctly created: {}", changed.join(", ")),
            )
            .await;
    }
    status.status_mut().provider_configs.clone_from(&names);

    let missing = confirm_mission_keys(ctx, mission, &object_ref).await?;

    let reconciled = format!("{} ProviderConfig(s) reconciled", names.len());
    if missing.is_empty() {
        Ok(reconciled)
    } else {
        Ok(format!("{reconciled}; missing MissionKey(s): {}", missing.join(", ")))
    }
}

#[cfg(test)]
#[path = "mission_tests.rs"]
mod mission_tests;
