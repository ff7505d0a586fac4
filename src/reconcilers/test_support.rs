// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fixtures shared by reconciler unit tests.
//!
//! Reconcilers are exercised against a `wiremock` server standing in for the
//! Kubernetes API server.

use kube::{Client, Config};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::MockServer;

use crate::config::OperatorConfig;
use crate::constants::{
    DEFAULT_AWS_PROVIDER_PACKAGE, DEFAULT_AZURE_PROVIDER_PACKAGE, DEFAULT_GCP_PROVIDER_PACKAGE,
    DEFAULT_HEALTH_PROBE_BIND_ADDRESS, DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_GRACE_SECS,
    DEFAULT_LEASE_NAMESPACE, DEFAULT_METRICS_BIND_ADDRESS,
};
use crate::context::Context;
use crate::crd::{
    CredentialConfig, Mission, MissionKey, MissionKeySpec, MissionSpec, PackageConfig, Provider,
    StorageBuckets, StorageBucketsMissionRef, StorageBucketsParameters, StorageBucketsSpec,
    VirtualMachine, VirtualMachineMissionRef, VirtualMachineParameters, VirtualMachineSpec,
};
use crate::events::RecordingEventPublisher;

pub const KEY_NAMESPACE: &str = "crossplane-system";

/// Kubernetes client talking to `server`.
pub fn mock_client(server: &MockServer) -> Client {
    let config = Config::new(server.uri().parse().unwrap());
    Client::try_from(config).unwrap()
}

/// Operator configuration built from the compiled-in defaults.
///
/// Built field by field so tests never read the process environment.
pub fn test_config() -> OperatorConfig {
    OperatorConfig {
        metrics_bind_address: DEFAULT_METRICS_BIND_ADDRESS.parse().unwrap(),
        health_probe_bind_address: DEFAULT_HEALTH_PROBE_BIND_ADDRESS.parse().unwrap(),
        leader_elect: false,
        lease_namespace: DEFAULT_LEASE_NAMESPACE.to_string(),
        lease_identity: None,
        lease_duration_secs: DEFAULT_LEASE_DURATION_SECS,
        lease_grace_secs: DEFAULT_LEASE_GRACE_SECS,
        gcp_provider_package: DEFAULT_GCP_PROVIDER_PACKAGE.to_string(),
        aws_provider_package: DEFAULT_AWS_PROVIDER_PACKAGE.to_string(),
        azure_provider_package: DEFAULT_AZURE_PROVIDER_PACKAGE.to_string(),
    }
}

/// Context backed by `server`, with events captured in memory.
pub fn mock_context(server: &MockServer) -> (Arc<Context>, Arc<RecordingEventPublisher>) {
    let events = Arc::new(RecordingEventPublisher::default());
    let ctx = Context::with_events(
        mock_client(server),
        test_config(),
        events.clone(),
    );
    (Arc::new(ctx), events)
}

/// Body of a 404 response from the API server.
pub fn not_found() -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": "not found",
        "reason": "NotFound",
        "code": 404
    })
}

/// Serialize `obj` as the API server would return it, with a `resourceVersion`.
pub fn persisted<T: Serialize>(obj: &T, resource_version: &str) -> Value {
    let mut value = serde_json::to_value(obj).unwrap();
    value["metadata"]["resourceVersion"] = json!(resource_version);
    value
}

pub fn package(provider: Provider, key: &str) -> PackageConfig {
    PackageConfig {
        provider,
        project_id: (provider == Provider::Gcp).then(|| "my-gcp-project".to_string()),
        credentials: CredentialConfig {
            name: key.to_string(),
            namespace: KEY_NAMESPACE.to_string(),
            key: "creds".to_string(),
        },
    }
}

pub fn test_mission(name: &str, packages: Vec<PackageConfig>) -> Mission {
    let mut mission = Mission::new(name, MissionSpec { packages });
    mission.metadata.uid = Some(format!("{name}-uid"));
    mission.metadata.generation = Some(1);
    mission
}

pub fn test_mission_key(name: &str, provider: Provider) -> MissionKey {
    let mut data = BTreeMap::new();
    data.insert("creds".to_string(), "{\"type\":\"service_account\"}".to_string());
    let mut key = MissionKey::new(
        name,
        MissionKeySpec {
            r#type: provider,
            data,
        },
    );
    key.metadata.namespace = Some(KEY_NAMESPACE.to_string());
    key.metadata.uid = Some(format!("{name}-uid"));
    key.metadata.generation = Some(1);
    key
}

pub fn test_virtual_machine(name: &str, mission: &str, key: &str) -> VirtualMachine {
    let mut vm = VirtualMachine::new(
        name,
        VirtualMachineSpec {
            mission_ref: VirtualMachineMissionRef {
                mission_name: mission.to_string(),
                key_name: key.to_string(),
            },
            for_provider: VirtualMachineParameters {
                name: String::new(),
                zone: "us-east-1a".to_string(),
                machine_type: "t3.micro".to_string(),
                image: "ami-0abcdef1234567890".to_string(),
                network: "default".to_string(),
                region: None,
            },
        },
    );
    vm.metadata.uid = Some(format!("{name}-uid"));
    vm.metadata.generation = Some(1);
    vm
}

pub fn test_storage_buckets(name: &str, mission: &str, key: &str) -> StorageBuckets {
    let mut buckets = StorageBuckets::new(
        name,
        StorageBucketsSpec {
            mission_ref: StorageBucketsMissionRef {
                mission_name: mission.to_string(),
                mission_key: key.to_string(),
            },
            for_provider: StorageBucketsParameters {
                name: String::new(),
                location: "US".to_string(),
            },
        },
    );
    buckets.metadata.uid = Some(format!("{name}-uid"));
    buckets.metadata.generation = Some(1);
    buckets
}
