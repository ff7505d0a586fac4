// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of the `Mission` and `MissionKey` a workload provisions through.
//!
//! `VirtualMachine` and `StorageBuckets` name a mission and a key. The mission
//! package whose credentials reference that key decides the provider and the
//! `ProviderConfig` the downstream Crossplane resource authenticates with.

use kube::{Api, Client};
use tracing::debug;

use crate::crd::{Mission, MissionKey, PackageConfig};
use crate::errors::MissionError;
use crate::reconcilers::mission::provider_config_names;

/// Everything a workload reconciler needs from its mission.
#[derive(Clone, Debug)]
pub struct MissionTarget {
    pub mission: Mission,
    pub package: PackageConfig,
    pub key: MissionKey,
    /// Name of the `ProviderConfig` generated for `package`.
    pub provider_config_name: String,
}

/// Fetch a cluster-scoped `Mission`.
///
/// # Errors
///
/// Returns [`MissionError::MissionNotFound`] if it does not exist.
pub async fn get_mission(client: &Client, name: &str) -> Result<Mission, MissionError> {
    let api: Api<Mission> = Api::all(client.clone());
    api.get_opt(name)
        .await?
        .ok_or_else(|| MissionError::MissionNotFound {
            mission: name.to_string(),
        })
}

/// Find the first package of `mission` whose credentials reference `key_name`.
///
/// Returns the package's position in `spec.packages` alongside it.
///
/// # Errors
///
/// Returns [`MissionError::MissionKeyNotReferenced`] if no package uses the key.
pub fn find_package<'a>(
    mission: &'a Mission,
    key_name: &str,
) -> Result<(usize, &'a PackageConfig), MissionError> {
    mission
        .spec
        .packages
        .iter()
        .enumerate()
        .find(|(_, pkg)| pkg.credentials.name == key_name)
        .ok_or_else(|| MissionError::MissionKeyNotReferenced {
            mission: mission.metadata.name.clone().unwrap_or_default(),
            key: key_name.to_string(),
        })
}

/// Fetch the `MissionKey` a package references, from the package's namespace.
///
/// # Errors
///
/// Returns [`MissionError::MissionKeyNotFound`] if it does not exist.
pub async fn get_mission_key(
    client: &Client,
    package: &PackageConfig,
) -> Result<MissionKey, MissionError> {
    let credentials = &package.credentials;
    let api: Api<MissionKey> = Api::namespaced(client.clone(), &credentials.namespace);
    api.get_opt(&credentials.name)
        .await?
        .ok_or_else(|| MissionError::MissionKeyNotFound {
            key: credentials.name.clone(),
            namespace: credentials.namespace.clone(),
        })
}

/// Resolve mission, package, key and `ProviderConfig` name for a workload.
///
/// # Errors
///
/// Returns the first lookup failure.
pub async fn resolve_mission_target(
    client: &Client,
    mission_name: &str,
    key_name: &str,
) -> Result<MissionTarget, MissionError> {
    let mission = get_mission(client, mission_name).await?;
    let (index, package) = find_package(&mission, key_name)?;
    let package = package.clone();
    let key = get_mission_key(client, &package).await?;
    let provider_config_name = provider_config_names(&mission)
        .into_iter()
        .nth(index)
        .unwrap_or_default();

    debug!(
        mission = %mission_name,
        key = %key_name,
        provider = %package.provider,
        provider_config = %provider_config_name,
        "Resolved mission target"
    );

    Ok(MissionTarget {
        mission,
        package,
        key,
        provider_config_name,
    })
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod lookup_tests;
