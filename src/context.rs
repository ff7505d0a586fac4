// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers.
//!
//! Every controller receives an `Arc<Context>` holding the Kubernetes client,
//! the event publisher and the operator configuration.

use kube::Client;
use std::sync::Arc;

use crate::config::OperatorConfig;
use crate::constants::CONTROLLER_NAME;
use crate::events::{EventPublisher, KubeEventPublisher};

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Publishes Kubernetes Events on reconciled resources
    pub events: Arc<dyn EventPublisher>,

    /// Operator configuration (provider package names, leader election)
    pub config: OperatorConfig,
}

impl Context {
    /// Build the production context, publishing events through the API server.
    #[must_use]
    pub fn new(client: Client, config: OperatorConfig) -> Self {
        let events = Arc::new(KubeEventPublisher::new(client.clone(), CONTROLLER_NAME));
        Self {
            client,
            events,
            config,
        }
    }

    /// Build a context with a custom event publisher.
    #[must_use]
    pub fn with_events(
        client: Client,
        config: OperatorConfig,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            client,
            events,
            config,
        }
    }
}
