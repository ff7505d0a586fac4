// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for Mission Control resources.
//!
//! # Condition Format
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (always `Ready` here)
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the status last flipped
//!
//! # Example
//!
//! ```rust,no_run
//! use mission_control::reconcilers::status::create_condition;
//!
//! let condition = create_condition(
//!     "Ready",
//!     "True",
//!     "Reconciled",
//!     "ProviderConfig apollo-gcp is up to date"
//! );
//! ```

use anyhow::Result;
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::crd::{
    Condition, Mission, MissionKey, MissionKeyStatus, MissionStatus, StorageBuckets,
    StorageBucketsStatus, VirtualMachine, VirtualMachineStatus,
};
use crate::errors::reason_for;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY, REASON_RECONCILED,
};

/// Create a new Kubernetes condition with the current timestamp.
///
/// # Example
///
/// ```rust,no_run
/// # use mission_control::reconcilers::status::create_condition;
/// let condition = create_condition("Ready", "False", "MissionNotFound", "Mission 'apollo' not found");
/// assert_eq!(condition.r#type, "Ready");
/// assert_eq!(condition.status, "False");
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Set a condition in place.
///
/// `lastTransitionTime` is kept when the status value is unchanged and reset
/// when it flips, so rewriting the same condition every reconcile does not
/// produce a status diff.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compare two condition lists ignoring order and `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    current.len() == new.len()
        && new.iter().all(|new_cond| {
            find_condition(current, &new_cond.r#type).is_some_and(|curr| {
                curr.status == new_cond.status
                    && curr.reason == new_cond.reason
                    && curr.message == new_cond.message
            })
        })
}

/// Status payload of a Mission Control resource.
pub trait ResourceStatus: Clone + Default + PartialEq + Serialize + Send + Sync {
    fn conditions(&self) -> &[Condition];
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
    fn set_observed_generation(&mut self, generation: Option<i64>);
}

/// A custom resource with a [`ResourceStatus`] subresource.
pub trait StatusResource:
    Resource<DynamicType = ()> + Clone + Debug + DeserializeOwned + Send + Sync + 'static
{
    type Status: ResourceStatus;

    fn current_status(&self) -> Option<&Self::Status>;
}

macro_rules! impl_status_resource {
    ($($kind:ty => $status:ty),+ $(,)?) => {
        $(
            impl ResourceStatus for $status {
                fn conditions(&self) -> &[Condition] {
                    &self.conditions
                }

                fn conditions_mut(&mut self) -> &mut Vec<Condition> {
                    &mut self.conditions
                }

                fn set_observed_generation(&mut self, generation: Option<i64>) {
                    self.observed_generation = generation;
                }
            }

            impl StatusResource for $kind {
                type Status = $status;

                fn current_status(&self) -> Option<&Self::Status> {
                    self.status.as_ref()
                }
            }
        )+
    };
}

impl_status_resource!(
    Mission => MissionStatus,
    MissionKey => MissionKeyStatus,
    VirtualMachine => VirtualMachineStatus,
    StorageBuckets => StorageBucketsStatus,
);

/// Whether a resource reports `Ready=True`.
#[must_use]
pub fn is_ready<K: StatusResource>(resource: &K) -> bool {
    resource
        .current_status()
        .and_then(|s| find_condition(s.conditions(), CONDITION_TYPE_READY))
        .is_some_and(|c| c.status == CONDITION_STATUS_TRUE)
}

/// Accumulates status changes during a reconcile and writes them in one patch.
///
/// Starts from the resource's current status, so fields the reconcile does not
/// touch are carried over. [`StatusUpdater::apply`] skips the API call when
/// nothing changed.
pub struct StatusUpdater<K: StatusResource> {
    name: String,
    namespace: Option<String>,
    current_status: Option<K::Status>,
    new_status: K::Status,
}

impl<K: StatusResource> StatusUpdater<K> {
    #[must_use]
    pub fn new(resource: &K) -> Self {
        let current_status = resource.current_status().cloned();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            name: resource.name_any(),
            namespace: resource.namespace(),
            current_status,
            new_status,
        }
    }

    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        update_condition_in_memory(
            self.new_status.conditions_mut(),
            condition_type,
            status,
            reason,
            message,
        );
    }

    /// Set `Ready=True`.
    pub fn set_ready(&mut self, reason: &str, message: &str) {
        self.set_condition(CONDITION_TYPE_READY, CONDITION_STATUS_TRUE, reason, message);
    }

    /// Set `Ready=False`.
    pub fn set_not_ready(&mut self, reason: &str, message: &str) {
        self.set_condition(CONDITION_TYPE_READY, CONDITION_STATUS_FALSE, reason, message);
    }

    pub fn set_observed_generation(&mut self, generation: Option<i64>) {
        self.new_status.set_observed_generation(generation);
    }

    /// Mutable access to kind-specific status fields.
    pub fn status_mut(&mut self) -> &mut K::Status {
        &mut self.new_status
    }

    #[must_use]
    pub fn status(&self) -> &K::Status {
        &self.new_status
    }

    /// Whether the accumulated status differs from what the API server holds.
    ///
    /// Conditions are compared without `lastTransitionTime`.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        let Some(current) = &self.current_status else {
            return true;
        };

        if !conditions_equal(current.conditions(), self.new_status.conditions()) {
            return true;
        }

        let mut current_fields = current.clone();
        current_fields.conditions_mut().clear();
        let mut new_fields = self.new_status.clone();
        new_fields.conditions_mut().clear();
        current_fields != new_fields
    }

    /// Patch the status subresource if anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the status patch fails.
    pub async fn apply(&self, api: &Api<K>) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "{} {} status unchanged, skipping update",
                K::kind(&()),
                self.display_name()
            );
            return Ok(());
        }

        let patch = json!({
            "status": self.new_status
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated {} {} status: {} condition(s)",
            K::kind(&()),
            self.display_name(),
            self.new_status.conditions().len()
        );

        Ok(())
    }

    /// Record the outcome of a reconcile as the `Ready` condition and patch status.
    ///
    /// `result` carries the `Ready=True` message on success. On failure the
    /// condition reason comes from the error, the status is still written, and
    /// the original error is returned so the controller requeues.
    ///
    /// # Errors
    ///
    /// Returns the reconcile error, or the status patch error if reconciling succeeded.
    pub async fn finish(mut self, api: &Api<K>, result: Result<String>) -> Result<()> {
        match result {
            Ok(message) => {
                self.set_ready(REASON_RECONCILED, &message);
                self.apply(api).await
            }
            Err(err) => {
                self.set_not_ready(reason_for(&err), &err.to_string());
                if let Err(status_err) = self.apply(api).await {
                    warn!(
                        "Failed to record failure on {} {}: {status_err}",
                        K::kind(&()),
                        self.display_name()
                    );
                }
                Err(err)
            }
        }
    }

    fn display_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}/{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
