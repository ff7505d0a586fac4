// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::constants::{
        API_VERSION, COMPUTE_API_GROUP, KIND_MISSION, KIND_MISSION_KEY, KIND_STORAGE_BUCKETS,
        KIND_VIRTUAL_MACHINE, MISSION_API_GROUP, STORAGE_API_GROUP,
    };
    use crate::crd::*;
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_provider_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Provider::Gcp).unwrap(), json!("gcp"));
        assert_eq!(serde_json::to_value(Provider::Aws).unwrap(), json!("aws"));
        assert_eq!(serde_json::to_value(Provider::Azure).unwrap(), json!("azure"));
    }

    #[test]
    fn test_provider_accepts_uppercase_aliases() {
        let gcp: Provider = serde_json::from_value(json!("GCP")).unwrap();
        let aws: Provider = serde_json::from_value(json!("AWS")).unwrap();
        let azure: Provider = serde_json::from_value(json!("Azure")).unwrap();

        assert_eq!(gcp, Provider::Gcp);
        assert_eq!(aws, Provider::Aws);
        assert_eq!(azure, Provider::Azure);
    }

    #[test]
    fn test_mission_crd_schema_admits_uppercase_providers() {
        let crd = serde_json::to_value(Mission::crd()).unwrap();
        let allowed = crd
            .pointer(
                "/spec/versions/0/schema/openAPIV3Schema/properties/spec/properties/packages/items/properties/provider/enum",
            )
            .and_then(|v| v.as_array())
            .expect("provider enum in Mission schema");

        for spelling in ["gcp", "aws", "azure", "GCP", "AWS", "AZURE", "Azure"] {
            assert!(
                allowed.contains(&json!(spelling)),
                "schema should admit provider {spelling}"
            );
            let parsed: Provider = serde_json::from_value(json!(spelling)).unwrap();
            assert_eq!(parsed.as_str(), spelling.to_ascii_lowercase());
        }
        assert_eq!(allowed.len(), PROVIDER_SPELLINGS.len());
    }

    #[test]
    fn test_provider_rejects_unknown_value() {
        let result: Result<Provider, _> = serde_json::from_value(json!("oracle"));
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("aws").unwrap(), Provider::Aws);
        assert_eq!(Provider::from_str("AzUrE").unwrap(), Provider::Azure);

        let err = Provider::from_str("digitalocean").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Provider digitalocean not supported, please use one of ["gcp", "aws", "azure"]"#
        );
    }

    #[test]
    fn test_provider_display_matches_as_str() {
        for provider in Provider::all() {
            assert_eq!(provider.to_string(), provider.as_str());
        }
    }

    #[test]
    fn test_mission_spec_deserializes_packages() {
        let spec: MissionSpec = serde_json::from_value(json!({
            "packages": [
                {
                    "provider": "gcp",
                    "projectId": "apollo-prod",
                    "credentials": { "name": "gcp-key", "namespace": "crossplane-system", "key": "creds" }
                },
                {
                    "provider": "aws",
                    "credentials": { "name": "aws-key", "namespace": "crossplane-system", "key": "creds" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(spec.packages.len(), 2);
        assert_eq!(spec.packages[0].project_id.as_deref(), Some("apollo-prod"));
        assert_eq!(spec.packages[1].provider, Provider::Aws);
        assert!(spec.packages[1].project_id.is_none());
    }

    #[test]
    fn test_mission_status_omits_empty_collections() {
        let status = MissionStatus::default();
        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(value, json!({ "conditions": [] }));
    }

    #[test]
    fn test_mission_key_data_defaults_to_empty() {
        let spec: MissionKeySpec = serde_json::from_value(json!({ "type": "aws" })).unwrap();

        assert_eq!(spec.r#type, Provider::Aws);
        assert!(spec.data.is_empty());
    }

    #[test]
    fn test_virtual_machine_zone_is_serialized_as_location() {
        let params: VirtualMachineParameters = serde_json::from_value(json!({
            "location": "us-central1-a",
            "machineType": "e2-medium",
            "image": "debian-cloud/debian-12"
        }))
        .unwrap();

        assert_eq!(params.zone, "us-central1-a");
        assert!(params.name.is_empty());
        assert!(params.network.is_empty());
        assert!(params.region.is_none());

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["location"], "us-central1-a");
        assert!(value.get("zone").is_none());
    }

    #[test]
    fn test_crd_scopes() {
        assert_eq!(Mission::crd().spec.scope, "Cluster");
        assert_eq!(MissionKey::crd().spec.scope, "Namespaced");
        assert_eq!(VirtualMachine::crd().spec.scope, "Cluster");
        assert_eq!(StorageBuckets::crd().spec.scope, "Cluster");
    }

    #[test]
    fn test_crd_groups_and_plurals() {
        assert_eq!(Mission::group(&()), MISSION_API_GROUP);
        assert_eq!(MissionKey::group(&()), MISSION_API_GROUP);
        assert_eq!(MissionKey::plural(&()), "missionkeys");
        assert_eq!(VirtualMachine::group(&()), COMPUTE_API_GROUP);
        assert_eq!(StorageBuckets::plural(&()), "storagebuckets");
        assert_eq!(StorageBuckets::group(&()), STORAGE_API_GROUP);

        assert_eq!(Mission::kind(&()), KIND_MISSION);
        assert_eq!(MissionKey::kind(&()), KIND_MISSION_KEY);
        assert_eq!(VirtualMachine::kind(&()), KIND_VIRTUAL_MACHINE);
        assert_eq!(StorageBuckets::kind(&()), KIND_STORAGE_BUCKETS);
        assert_eq!(Mission::version(&()), API_VERSION);
    }

    #[test]
    fn test_crds_have_status_subresource() {
        for crd in [
            Mission::crd(),
            MissionKey::crd(),
            VirtualMachine::crd(),
            StorageBuckets::crd(),
        ] {
            let version = &crd.spec.versions[0];
            assert_eq!(version.name, API_VERSION);
            assert!(
                version
                    .subresources
                    .as_ref()
                    .and_then(|s| s.status.as_ref())
                    .is_some(),
                "{} should have a status subresource",
                crd.spec.names.kind
            );
        }
    }
}
