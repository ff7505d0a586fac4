// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - requeue policy and signal handling

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::{error_requeue_after, requeue_after, ReconcileError};
    use mission_control::constants::{
        ERROR_REQUEUE_DURATION_SECS, NOT_READY_REQUEUE_DURATION_SECS,
        PERMANENT_ERROR_REQUEUE_DURATION_SECS, READY_REQUEUE_DURATION_SECS,
    };
    use mission_control::errors::{reason_for, MissionError};

    #[test]
    fn test_requeue_after_ready_uses_long_interval() {
        assert_eq!(
            requeue_after(true),
            Duration::from_secs(READY_REQUEUE_DURATION_SECS)
        );
    }

    #[test]
    fn test_requeue_after_not_ready_uses_short_interval() {
        assert_eq!(
            requeue_after(false),
            Duration::from_secs(NOT_READY_REQUEUE_DURATION_SECS)
        );
        assert!(requeue_after(false) < requeue_after(true));
    }

    #[test]
    fn test_reconcile_error_keeps_mission_error_reason() {
        let err = ReconcileError::from(anyhow::Error::new(MissionError::MissionNotFound {
            mission: "apollo".to_string(),
        }));

        assert_eq!(err.to_string(), "Mission 'apollo' not found");
        assert_eq!(reason_for(&err.0), "MissionNotFound");
    }

    #[test]
    fn test_error_requeue_retries_missing_dependencies_quickly() {
        let err = anyhow::Error::new(MissionError::CrossplaneNotInstalled {
            crd: "providers.pkg.crossplane.io".to_string(),
        })
        .context("reconciling mission apollo");

        assert_eq!(
            error_requeue_after(&err),
            Duration::from_secs(ERROR_REQUEUE_DURATION_SECS)
        );
    }

    #[test]
    fn test_error_requeue_backs_off_on_invalid_spec() {
        let err = anyhow::Error::new(MissionError::MissionKeyNotReferenced {
            mission: "apollo".to_string(),
            key: "stray-key".to_string(),
        });

        assert_eq!(
            error_requeue_after(&err),
            Duration::from_secs(PERMANENT_ERROR_REQUEUE_DURATION_SECS)
        );
    }

    #[test]
    fn test_error_requeue_treats_foreign_errors_as_transient() {
        let err = anyhow::anyhow!("connection reset by peer");

        assert_eq!(
            error_requeue_after(&err),
            Duration::from_secs(ERROR_REQUEUE_DURATION_SECS)
        );
    }

    /// Test that SIGTERM signal handler can be created on Unix platforms
    #[tokio::test]
    #[cfg(unix)]
    async fn test_sigterm_signal_handler_creation() {
        use tokio::signal::unix::{signal, SignalKind};

        let result = signal(SignalKind::terminate());
        assert!(
            result.is_ok(),
            "Should be able to create SIGTERM signal handler"
        );
    }

    /// Test that SIGINT (Ctrl+C) signal handler can be set up
    #[tokio::test]
    async fn test_sigint_handler_exists() {
        let ctrl_c_future = tokio::signal::ctrl_c();

        // We expect a timeout since no SIGINT is sent
        let result = timeout(Duration::from_millis(100), ctrl_c_future).await;
        assert!(
            result.is_err(),
            "ctrl_c() future should timeout when no signal is sent"
        );
    }

    #[tokio::test]
    async fn test_leadership_lost_without_election_never_resolves() {
        let result = timeout(Duration::from_millis(50), crate::leadership_lost(None)).await;
        assert!(result.is_err(), "pending future should time out");
    }
}
