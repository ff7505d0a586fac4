// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `MissionKey` reconciliation logic.
//!
//! A `MissionKey` is materialized as an `Opaque` `Secret` holding the
//! credential data and a `ServiceAccount`, both named after the key, living in
//! the key's namespace and owned by it. `ProviderConfig`s generated for a
//! `Mission` reference the `Secret`.

use anyhow::{anyhow, Result};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use k8s_openapi::ByteString;
use kube::{Api, Resource, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::crd::MissionKey;
use crate::events::{actions, reasons};
use crate::labels::{standard_labels, COMPONENT_CREDENTIALS, PROVIDER_LABEL};
use crate::reconcilers::resources::{owned_metadata, reconcile_object};
use crate::reconcilers::should_reconcile;
use crate::reconcilers::status::StatusUpdater;

const SECRET_TYPE_OPAQUE: &str = "Opaque";

fn key_labels(key: &MissionKey) -> BTreeMap<String, String> {
    let mut labels = standard_labels(COMPONENT_CREDENTIALS, &key.name_any());
    labels.insert(PROVIDER_LABEL.to_string(), key.spec.r#type.to_string());
    labels
}

fn key_namespace(key: &MissionKey) -> Result<String> {
    key.namespace()
        .ok_or_else(|| anyhow!("MissionKey {} has no namespace", key.name_any()))
}

/// Build the `Secret` carrying the key's credential data.
///
/// Values are copied byte for byte; the API server base64-encodes them.
///
/// # Errors
///
/// Returns an error if the key has no namespace or uid.
pub fn build_secret(key: &MissionKey) -> Result<Secret> {
    let namespace = key_namespace(key)?;
    let data: BTreeMap<String, ByteString> = key
        .spec
        .data
        .iter()
        .map(|(k, v)| (k.clone(), ByteString(v.as_bytes().to_vec())))
        .collect();

    Ok(Secret {
        metadata: owned_metadata(key, &key.name_any(), Some(&namespace), key_labels(key))?,
        type_: Some(SECRET_TYPE_OPAQUE.to_string()),
        data: Some(data),
        ..Default::default()
    })
}

/// Build the `ServiceAccount` paired with the key.
///
/// # Errors
///
/// Returns an error if the key has no namespace or uid.
pub fn build_service_account(key: &MissionKey) -> Result<ServiceAccount> {
    let namespace = key_namespace(key)?;
    Ok(ServiceAccount {
        metadata: owned_metadata(key, &key.name_any(), Some(&namespace), key_labels(key))?,
        ..Default::default()
    })
}

/// Reconciles a `MissionKey` resource.
///
/// An empty `data` map only raises a Warning event; the `Secret` is still
/// created so a `ProviderConfig` referencing it resolves once data is added.
///
/// # Errors
///
/// Returns an error if the key has no namespace or any Kubernetes API call fails.
pub async fn reconcile_missionkey(ctx: Arc<Context>, key: MissionKey) -> Result<()> {
    let name = key.name_any();
    let namespace = key_namespace(&key)?;

    if should_reconcile(
        key.metadata.generation,
        key.status.as_ref().and_then(|s| s.observed_generation),
    ) {
        info!("Reconciling MissionKey: {namespace}/{name} (spec changed)");
    } else {
        debug!("Reconciling MissionKey: {namespace}/{name} (periodic resync)");
    }

    let object_ref = key.object_ref(&());
    if key.spec.data.is_empty() {
        warn!("MissionKey {namespace}/{name} has no credential data");
        ctx.events
            .warning(
                &object_ref,
                reasons::EMPTY_CREDENTIALS,
                actions::VALIDATE,
                format!("MissionKey {name} has no data, the Secret will be empty"),
            )
            .await;
    }

    let mut status = StatusUpdater::new(&key);
    status.set_observed_generation(key.metadata.generation);

    let result = reconcile_credentials(&ctx, &key, &namespace).await;
    match &result {
        Ok(_) => {
            status.status_mut().secret_name = Some(name.clone());
            status.status_mut().service_account_name = Some(name.clone());
        }
        Err(e) => {
            ctx.events
                .warning(
                    &object_ref,
                    reasons::CREDENTIALS_FAILED,
                    actions::RECONCILE,
                    format!("Could not reconcile credentials for MissionKey {name}: {e}"),
                )
                .await;
        }
    }

    let api: Api<MissionKey> = Api::namespaced(ctx.client.clone(), &namespace);
    status.finish(&api, result).await
}

async fn reconcile_credentials(ctx: &Context, key: &MissionKey, namespace: &str) -> Result<String> {
    let name = key.name_any();

    let secrets: Api<Secret> = Api::namespaced(ctx.client.clone(), namespace);
    let secret_outcome = reconcile_object(&secrets, &build_secret(key)?).await?;

    let service_accounts: Api<ServiceAccount> = Api::namespaced(ctx.client.clone(), namespace);
    let sa_outcome = reconcile_object(&service_accounts, &build_service_account(key)?).await?;

    if secret_outcome.changed() || sa_outcome.changed() {
        ctx.events
            .normal(
                &key.object_ref(&()),
                reasons::CREDENTIALS_READY,
                actions::RECONCILE,
                format!("Secret and ServiceAccount {name} are ready in namespace {namespace}"),
            )
            .await;
    }

    Ok(format!(
        "Secret {name} holds {} credential key(s)",
        key.spec.data.len()
    ))
}

#[cfg(test)]
#[path = "missionkey_tests.rs"]
mod missionkey_tests;
