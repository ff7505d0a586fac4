// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use crate::errors::{reason_for, MissionError};
    use crate::status_reasons::*;

    fn not_referenced() -> MissionError {
        MissionError::MissionKeyNotReferenced {
            mission: "apollo".to_string(),
            key: "orphan-key".to_string(),
        }
    }

    #[test]
    fn test_status_reason_mapping() {
        let cases = [
            (
                MissionError::CrossplaneNotInstalled {
                    crd: "providers.pkg.crossplane.io".to_string(),
                },
                REASON_CROSSPLANE_NOT_INSTALLED,
            ),
            (
                MissionError::ProviderNotInstalled {
                    provider: "gcp".to_string(),
                    package: "provider-gcp-family".to_string(),
                },
                REASON_PROVIDER_NOT_INSTALLED,
            ),
            (
                MissionError::MissionNotFound {
                    mission: "apollo".to_string(),
                },
                REASON_MISSION_NOT_FOUND,
            ),
            (not_referenced(), REASON_MISSION_KEY_NOT_REFERENCED),
            (
                MissionError::MissionKeyNotFound {
                    key: "gcp-key".to_string(),
                    namespace: "crossplane-system".to_string(),
                },
                REASON_MISSION_KEY_NOT_FOUND,
            ),
        ];

        for (err, reason) in cases {
            assert_eq!(err.status_reason(), reason, "{err}");
        }
    }

    #[test]
    fn test_spec_errors_are_not_transient() {
        assert!(!not_referenced().is_transient());
        assert!(!MissionError::InvalidPackage {
            mission: "apollo".to_string(),
            index: 0,
            provider: "gcp".to_string(),
            reason: "projectId is required".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_missing_dependencies_are_transient() {
        assert!(MissionError::MissionNotFound {
            mission: "apollo".to_string()
        }
        .is_transient());
        assert!(MissionError::CrossplaneNotInstalled {
            crd: "providers.pkg.crossplane.io".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            not_referenced().to_string(),
            "MissionKey 'orphan-key' is not referenced by any package of mission 'apollo'"
        );
        assert_eq!(
            MissionError::InvalidPackage {
                mission: "apollo".to_string(),
                index: 1,
                provider: "gcp".to_string(),
                reason: "projectId is required".to_string(),
            }
            .to_string(),
            "Invalid package 1 (gcp) in mission 'apollo': projectId is required"
        );
    }

    #[test]
    fn test_reason_for_downcasts_through_context() {
        let err = anyhow::Error::new(not_referenced()).context("resolving VirtualMachine web-1");
        assert_eq!(reason_for(&err), REASON_MISSION_KEY_NOT_REFERENCED);
    }

    #[test]
    fn test_reason_for_unknown_error() {
        let err = anyhow::anyhow!("connection reset");
        assert_eq!(reason_for(&err), REASON_RECONCILE_FAILED);
    }
}
