// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label constants used across all reconcilers.
//!
//! Every object the operator creates carries the standard Kubernetes labels below
//! so it can be traced back to the custom resource that produced it.

use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_MISSION_CONTROL: &str = "mission-control";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_MISSION_CONTROL: &str = "mission-control-operator";

/// Component value for `ProviderConfig` objects
pub const COMPONENT_PROVIDER_CONFIG: &str = "provider-config";

/// Component value for credential `Secret` and `ServiceAccount` objects
pub const COMPONENT_CREDENTIALS: &str = "credentials";

/// Component value for compute instances
pub const COMPONENT_INSTANCE: &str = "instance";

/// Component value for storage buckets
pub const COMPONENT_BUCKET: &str = "bucket";

// ============================================================================
// Mission Control Labels
// ============================================================================

/// Label naming the `Mission` a downstream object belongs to
pub const MISSION_LABEL: &str = "mission-control.apis.io/mission";

/// Label naming the provider a downstream object targets
pub const PROVIDER_LABEL: &str = "mission-control.apis.io/provider";

/// Build the standard label set for a downstream object.
///
/// `instance` is the name of the owning custom resource.
#[must_use]
pub fn standard_labels(component: &str, instance: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(K8S_COMPONENT.to_string(), component.to_string());
    labels.insert(K8S_INSTANCE.to_string(), instance.to_string());
    labels.insert(
        K8S_MANAGED_BY.to_string(),
        MANAGED_BY_MISSION_CONTROL.to_string(),
    );
    labels.insert(K8S_PART_OF.to_string(), PART_OF_MISSION_CONTROL.to_string());
    labels
}
