// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration for the operator binary.

use clap::Parser;
use std::net::SocketAddr;

use crate::constants::{
    DEFAULT_AWS_PROVIDER_PACKAGE, DEFAULT_AZURE_PROVIDER_PACKAGE, DEFAULT_GCP_PROVIDER_PACKAGE,
    DEFAULT_HEALTH_PROBE_BIND_ADDRESS, DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_GRACE_SECS,
    DEFAULT_LEASE_NAMESPACE, DEFAULT_METRICS_BIND_ADDRESS,
};
use crate::crd::Provider;

/// Mission Control - reconciles missions into Crossplane resources
#[derive(Parser, Debug, Clone)]
#[command(name = "mission-control", version, about, long_about = None)]
pub struct OperatorConfig {
    /// Address the Prometheus metrics endpoint binds to
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Address the liveness and readiness probes bind to
    #[arg(long, env = "HEALTH_PROBE_BIND_ADDRESS", default_value = DEFAULT_HEALTH_PROBE_BIND_ADDRESS)]
    pub health_probe_bind_address: SocketAddr,

    /// Enable leader election so only one replica runs the controllers
    #[arg(long, env = "LEADER_ELECT", default_value_t = false)]
    pub leader_elect: bool,

    /// Namespace holding the leader election lease
    #[arg(long, env = "POD_NAMESPACE", default_value = DEFAULT_LEASE_NAMESPACE)]
    pub lease_namespace: String,

    /// Identity written into the lease; defaults to the pod name or hostname
    #[arg(long, env = "POD_NAME")]
    pub lease_identity: Option<String>,

    /// Lease duration in seconds
    #[arg(long, default_value_t = DEFAULT_LEASE_DURATION_SECS)]
    pub lease_duration_secs: u64,

    /// Seconds before expiry at which the holder renews the lease
    #[arg(long, default_value_t = DEFAULT_LEASE_GRACE_SECS)]
    pub lease_grace_secs: u64,

    /// Crossplane `Provider` package backing GCP missions
    #[arg(long, default_value = DEFAULT_GCP_PROVIDER_PACKAGE)]
    pub gcp_provider_package: String,

    /// Crossplane `Provider` package backing AWS missions
    #[arg(long, default_value = DEFAULT_AWS_PROVIDER_PACKAGE)]
    pub aws_provider_package: String,

    /// Crossplane `Provider` package backing Azure missions
    #[arg(long, default_value = DEFAULT_AZURE_PROVIDER_PACKAGE)]
    pub azure_provider_package: String,
}

impl OperatorConfig {
    /// Name of the Crossplane `Provider` object that must be installed for `provider`.
    #[must_use]
    pub fn provider_package(&self, provider: Provider) -> &str {
        match provider {
            Provider::Gcp => &self.gcp_provider_package,
            Provider::Aws => &self.aws_provider_package,
            Provider::Azure => &self.azure_provider_package,
        }
    }

    /// Lease holder identity: the explicit flag, else the hostname, else a fixed name.
    #[must_use]
    pub fn identity(&self) -> String {
        self.lease_identity
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .unwrap_or_else(|| crate::constants::CONTROLLER_NAME.to_string())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
