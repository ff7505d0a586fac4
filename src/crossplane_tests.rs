// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crossplane.rs`

#[cfg(test)]
mod tests {
    use crate::crd::Condition;
    use crate::crossplane::*;
    use serde_json::json;

    fn provider_with(conditions: Vec<Condition>) -> CrossplaneProvider {
        let mut provider =
            CrossplaneProvider::new("provider-gcp-family", CrossplaneProviderSpec::default());
        provider.status = Some(CrossplaneProviderStatus { conditions });
        provider
    }

    fn condition(r#type: &str, status: &str) -> Condition {
        Condition {
            r#type: r#type.to_string(),
            status: status.to_string(),
            ..Condition::default()
        }
    }

    #[test]
    fn test_crd_names() {
        assert_eq!(crd_name::<CrossplaneProvider>(), "providers.pkg.crossplane.io");
        assert_eq!(crd_name::<GcpProviderConfig>(), "providerconfigs.gcp.upbound.io");
        assert_eq!(crd_name::<AwsInstance>(), "instances.ec2.aws.upbound.io");
        assert_eq!(crd_name::<GcpBucket>(), "buckets.storage.gcp.upbound.io");
        assert_eq!(crd_name::<AwsBucket>(), "buckets.s3.aws.upbound.io");
    }

    #[test]
    fn test_provider_condition_status() {
        let provider = provider_with(vec![
            condition("Installed", "True"),
            condition("Healthy", "False"),
        ]);

        assert_eq!(provider_condition_status(&provider, "Installed"), "True");
        assert_eq!(provider_condition_status(&provider, "Healthy"), "False");
    }

    #[test]
    fn test_provider_condition_status_unknown_when_missing() {
        let provider = provider_with(vec![]);
        assert_eq!(provider_condition_status(&provider, "Healthy"), "Unknown");

        let bare = CrossplaneProvider::new("provider-aws", CrossplaneProviderSpec::default());
        assert_eq!(provider_condition_status(&bare, "Installed"), "Unknown");
    }

    #[test]
    fn test_gcp_provider_config_uses_project_id_casing() {
        let config = GcpProviderConfig::new(
            "apollo-gcp",
            GcpProviderConfigSpec {
                project_id: "apollo-prod".to_string(),
                credentials: ProviderCredentials {
                    source: "Secret".to_string(),
                    secret_ref: Some(SecretKeySelector {
                        name: "gcp-key".to_string(),
                        namespace: "crossplane-system".to_string(),
                        key: "creds".to_string(),
                    }),
                },
            },
        );

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["apiVersion"], "gcp.upbound.io/v1beta1");
        assert_eq!(value["kind"], "ProviderConfig");
        assert_eq!(value["spec"]["projectID"], "apollo-prod");
        assert_eq!(
            value["spec"]["credentials"]["secretRef"],
            json!({ "name": "gcp-key", "namespace": "crossplane-system", "key": "creds" })
        );
    }

    #[test]
    fn test_provider_status_ignores_unknown_fields() {
        let provider: CrossplaneProvider = serde_json::from_value(json!({
            "apiVersion": "pkg.crossplane.io/v1",
            "kind": "Provider",
            "metadata": { "name": "provider-aws-ec2" },
            "spec": { "package": "xpkg.upbound.io/upbound/provider-aws-ec2:v1", "revisionActivationPolicy": "Automatic" },
            "status": {
                "currentRevision": "provider-aws-ec2-abc",
                "conditions": [{ "type": "Healthy", "status": "True", "reason": "HealthyPackageRevision" }]
            }
        }))
        .unwrap();

        assert_eq!(provider_condition_status(&provider, "Healthy"), "True");
    }
}
