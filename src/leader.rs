// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Leader election on a `coordination.k8s.io` `Lease`.
//!
//! With `--leader-elect`, replicas race for the `mission-control-leader` lease.
//! Only the holder runs controllers; a replica that loses the lease exits so
//! its Deployment restarts it as a follower.

use anyhow::{bail, Result};
use kube::Client;
use kube_lease_manager::{LeaseManager, LeaseManagerBuilder};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::OperatorConfig;
use crate::constants::LEADER_LEASE_NAME;
use crate::metrics::{record_leader_elected, record_leader_lost};

/// A running lease manager and the leadership state it publishes.
pub struct LeaderElection {
    identity: String,
    channel: watch::Receiver<bool>,
    task: JoinHandle<kube_lease_manager::Result<LeaseManager>>,
}

impl LeaderElection {
    /// Start competing for the lease described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease manager cannot be created.
    pub async fn start(client: Client, config: &OperatorConfig) -> Result<Self> {
        let identity = config.identity();
        info!(
            lease = LEADER_LEASE_NAME,
            namespace = %config.lease_namespace,
            identity = %identity,
            duration_secs = config.lease_duration_secs,
            grace_secs = config.lease_grace_secs,
            "Starting leader election"
        );

        let manager = LeaseManagerBuilder::new(client, LEADER_LEASE_NAME)
            .with_namespace(config.lease_namespace.clone())
            .with_identity(identity.clone())
            .with_duration(config.lease_duration_secs)
            .with_grace(config.lease_grace_secs)
            .build()
            .await?;

        let (channel, task) = manager.watch().await;

        Ok(Self {
            identity,
            channel,
            task,
        })
    }

    /// Wait until this replica holds the lease.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease manager stops.
    pub async fn wait_until_leader(&mut self) -> Result<()> {
        loop {
            if *self.channel.borrow_and_update() {
                info!(identity = %self.identity, "Acquired leadership");
                record_leader_elected(&self.identity);
                return Ok(());
            }

            debug!(identity = %self.identity, "Waiting for leadership");
            if self.channel.changed().await.is_err() {
                bail!("Leader election stopped before leadership was acquired");
            }
        }
    }

    /// Resolve once leadership is lost. Never returns `Ok`.
    ///
    /// # Errors
    ///
    /// Always returns an error describing why leadership ended.
    pub async fn lost(&mut self) -> Result<()> {
        loop {
            if self.channel.changed().await.is_err() {
                record_leader_lost(&self.identity);
                bail!("Leader election stopped unexpectedly");
            }

            if !*self.channel.borrow_and_update() {
                warn!(identity = %self.identity, "Lost leadership");
                record_leader_lost(&self.identity);
                bail!("Leadership lost, shutting down controllers");
            }
        }
    }

    /// Stop renewing and release the lease.
    pub async fn release(self) {
        let Self {
            identity,
            channel,
            task,
        } = self;
        drop(channel);

        match task.await {
            Ok(Ok(_)) => info!(identity = %identity, "Released leader lease"),
            Ok(Err(e)) => warn!(identity = %identity, error = %e, "Lease manager failed while releasing"),
            Err(e) => warn!(identity = %identity, error = %e, "Lease manager task panicked"),
        }
    }
}
