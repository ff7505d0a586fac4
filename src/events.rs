// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes Event recording for Mission Control controllers.
//!
//! Every reconcile loop reports its outcome as an Event on the custom resource,
//! visible via `kubectl describe`. Publishing is fire-and-forget: failures are
//! logged as warnings and never fail a reconciliation.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use std::sync::Mutex;
use tracing::warn;

/// Publishes Kubernetes Events about a resource.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an Event on `resource_ref`.
    ///
    /// # Arguments
    ///
    /// * `resource_ref` - The Kubernetes object this event is about
    /// * `type_` - Normal or Warning
    /// * `reason` - Machine-readable reason (see [`reasons`])
    /// * `action` - What the operator was doing (see [`actions`])
    /// * `note` - Human-readable message
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: Option<String>,
    );

    /// Publish a `Normal` event.
    async fn normal(&self, resource_ref: &ObjectReference, reason: &str, action: &str, note: String) {
        self.publish(resource_ref, EventType::Normal, reason, action, Some(note))
            .await;
    }

    /// Publish a `Warning` event.
    async fn warning(&self, resource_ref: &ObjectReference, reason: &str, action: &str, note: String) {
        self.publish(resource_ref, EventType::Warning, reason, action, Some(note))
            .await;
    }
}

/// Production implementation wrapping `kube::runtime::events::Recorder`.
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    /// Create a publisher reporting as `controller_name`.
    #[must_use]
    pub fn new(client: Client, controller_name: &str) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: Option<String>,
    ) {
        let event = Event {
            type_,
            reason: reason.to_string(),
            note,
            action: action.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, resource_ref).await {
            warn!(
                reason,
                action,
                error = %e,
                "Failed to publish Kubernetes event"
            );
        }
    }
}

/// Discards every event.
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(
        &self,
        _resource_ref: &ObjectReference,
        _type_: EventType,
        _reason: &str,
        _action: &str,
        _note: Option<String>,
    ) {
    }
}

/// An event captured by [`RecordingEventPublisher`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedEvent {
    pub object_name: Option<String>,
    pub warning: bool,
    pub reason: String,
    pub action: String,
    pub note: Option<String>,
}

/// Keeps every published event in memory so tests can assert on them.
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingEventPublisher {
    /// Snapshot of the events published so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Reasons of the events published so far, in order.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.reason).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(
        &self,
        resource_ref: &ObjectReference,
        type_: EventType,
        reason: &str,
        action: &str,
        note: Option<String>,
    ) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RecordedEvent {
                object_name: resource_ref.name.clone(),
                warning: matches!(type_, EventType::Warning),
                reason: reason.to_string(),
                action: action.to_string(),
                note,
            });
        }
    }
}

/// Well-known event reason strings.
///
/// These appear in `kubectl get events` under the REASON column.
pub mod reasons {
    // Mission
    /// `providers.pkg.crossplane.io` CRD is missing
    pub const CROSSPLANE_NOT_FOUND: &str = "CrossplaneNotFound";
    /// A mission package failed validation
    pub const INVALID_PACKAGE: &str = "InvalidPackage";
    /// A Crossplane provider package is not installed
    pub const PROVIDER_NOT_INSTALLED: &str = "ProviderNotInstalled";
    /// Every provider package of the mission is installed
    pub const CONNECTED: &str = "Connected";
    /// A `ProviderConfig` could not be reconciled
    pub const PROVIDER_CONFIG_FAILED: &str = "ProviderConfigFailed";
    /// A `ProviderConfig` was created or updated
    pub const PROVIDER_CONFIG_READY: &str = "ProviderConfigReady";
    /// A package references a `MissionKey` that does not exist
    pub const MISSION_KEY_NOT_FOUND: &str = "MissionKeyNotFound";
    /// A package references an existing `MissionKey`
    pub const MISSION_KEY_LINKED: &str = "MissionKeyLinked";

    // MissionKey
    /// The key carries no credential data
    pub const EMPTY_CREDENTIALS: &str = "EmptyCredentials";
    /// Secret and `ServiceAccount` are in place
    pub const CREDENTIALS_READY: &str = "CredentialsReady";
    /// Secret or `ServiceAccount` could not be reconciled
    pub const CREDENTIALS_FAILED: &str = "CredentialsFailed";

    // Workloads
    /// Mission or key lookup failed
    pub const MISSION_RESOLUTION_FAILED: &str = "MissionResolutionFailed";
    /// The provider has no mapping for this kind
    pub const UNSUPPORTED_PROVIDER: &str = "UnsupportedProvider";
    /// Compute instance created
    pub const INSTANCE_CREATED: &str = "InstanceCreated";
    /// Compute instance updated to match the spec
    pub const INSTANCE_UPDATED: &str = "InstanceUpdated";
    /// Compute instance could not be reconciled
    pub const INSTANCE_FAILED: &str = "InstanceFailed";
    /// Bucket created
    pub const BUCKET_CREATED: &str = "BucketCreated";
    /// Bucket updated to match the spec
    pub const BUCKET_UPDATED: &str = "BucketUpdated";
    /// Bucket could not be reconciled
    pub const BUCKET_FAILED: &str = "BucketFailed";
}

/// Well-known event action strings.
///
/// These appear in `kubectl get events` under the ACTION column.
pub mod actions {
    /// Standard reconciliation loop
    pub const RECONCILE: &str = "Reconcile";
    /// Checking a dependency exists
    pub const VALIDATE: &str = "Validate";
    /// Creating a downstream object
    pub const CREATE: &str = "Create";
    /// Updating a downstream object
    pub const UPDATE: &str = "Update";
}
