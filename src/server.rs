// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoints for Prometheus scraping and kubelet probes.
//!
//! Two listeners are served:
//!
//! - the metrics address serves `/metrics` in Prometheus text format
//! - the probe address serves `/healthz` (always `ok` while the process runs)
//!   and `/readyz`, which answers 503 until the controllers have started

use anyhow::{Context as _, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use crate::constants::{HEALTHZ_PATH, METRICS_SERVER_PATH, READYZ_PATH};
use crate::metrics::gather_metrics;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Shared readiness flag, flipped once the controllers are running.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn mark_not_ready(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Router for the metrics listener.
pub fn metrics_routes() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics))
}

/// Router for the health probe listener.
pub fn probe_routes(readiness: Readiness) -> Router {
    Router::new()
        .route(HEALTHZ_PATH, get(healthz))
        .route(READYZ_PATH, get(readyz))
        .with_state(readiness)
}

pub(crate) async fn metrics() -> Response {
    match gather_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn readyz(State(readiness): State<Readiness>) -> (StatusCode, &'static str) {
    if readiness.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "controllers not started")
    }
}

/// Bind `addr` and serve `router` until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(name: &str, addr: SocketAddr, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {name} server to {addr}"))?;

    info!("{name} server listening on {addr}");
    axum::serve(listener, router)
        .await
        .with_context(|| format!("{name} server on {addr} failed"))
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
