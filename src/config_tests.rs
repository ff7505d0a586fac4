// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for config.rs

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_defaults_match_manager_conventions() {
        let config = OperatorConfig::parse_from(["mission-control"]);
        assert_eq!(config.metrics_bind_address.port(), 8080);
        assert_eq!(config.health_probe_bind_address.port(), 8081);
        assert!(!config.leader_elect);
        assert_eq!(config.lease_duration_secs, 15);
        assert_eq!(config.lease_grace_secs, 2);
    }

    #[test]
    fn test_provider_package_defaults() {
        let config = OperatorConfig::parse_from(["mission-control"]);
        assert_eq!(config.provider_package(Provider::Gcp), "provider-gcp-family");
        assert_eq!(config.provider_package(Provider::Aws), "provider-aws-family");
        assert_eq!(
            config.provider_package(Provider::Azure),
            "provider-azure-family"
        );
    }

    #[test]
    fn test_provider_package_override() {
        let config = OperatorConfig::parse_from([
            "mission-control",
            "--aws-provider-package",
            "upbound-provider-aws",
            "--leader-elect",
            "--metrics-bind-address",
            "127.0.0.1:9090",
        ]);
        assert_eq!(config.provider_package(Provider::Aws), "upbound-provider-aws");
        assert!(config.leader_elect);
        assert_eq!(config.metrics_bind_address.port(), 9090);
    }

    #[test]
    fn test_fixture_config_matches_cli_defaults() {
        let fixture = crate::reconcilers::test_support::test_config();
        assert_eq!(fixture.metrics_bind_address.port(), 8080);
        assert_eq!(fixture.health_probe_bind_address.port(), 8081);
        assert!(!fixture.leader_elect);
        assert_eq!(fixture.lease_identity, None);
        for provider in Provider::all() {
            assert_eq!(
                fixture.provider_package(provider),
                format!("provider-{provider}-family")
            );
        }
    }

    #[test]
    fn test_identity_prefers_explicit_flag() {
        let config =
            OperatorConfig::parse_from(["mission-control", "--lease-identity", "replica-0"]);
        assert_eq!(config.identity(), "replica-0");
    }
}
