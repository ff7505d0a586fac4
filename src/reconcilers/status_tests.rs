// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{
        Condition, Mission, MissionPackageStatus, MissionSpec, MissionStatus, VirtualMachine,
        VirtualMachineMissionRef, VirtualMachineParameters, VirtualMachineSpec,
    };
    use crate::reconcilers::status::{
        conditions_equal, create_condition, find_condition, is_ready, update_condition_in_memory,
        StatusUpdater,
    };

    const CONDITION_TYPE_READY: &str = "Ready";
    const STATUS_TRUE: &str = "True";
    const STATUS_FALSE: &str = "False";

    fn mission_with_status(status: Option<MissionStatus>) -> Mission {
        let mut mission = Mission::new("apollo", MissionSpec { packages: vec![] });
        mission.metadata.generation = Some(2);
        mission.status = status;
        mission
    }

    fn ready_condition(time: &str) -> Condition {
        Condition {
            r#type: CONDITION_TYPE_READY.to_string(),
            status: STATUS_TRUE.to_string(),
            reason: Some("Reconciled".to_string()),
            message: Some("All good".to_string()),
            last_transition_time: Some(time.to_string()),
        }
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition(CONDITION_TYPE_READY, STATUS_TRUE, "Reconciled", "ok");

        assert_eq!(condition.r#type, CONDITION_TYPE_READY);
        assert_eq!(condition.status, STATUS_TRUE);
        assert_eq!(condition.reason.as_deref(), Some("Reconciled"));
        assert_eq!(condition.message.as_deref(), Some("ok"));
        assert!(condition.last_transition_time.is_some());
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![
            create_condition("Synced", STATUS_TRUE, "Synced", "synced"),
            create_condition(CONDITION_TYPE_READY, STATUS_FALSE, "Pending", "waiting"),
        ];

        let found = find_condition(&conditions, CONDITION_TYPE_READY).unwrap();
        assert_eq!(found.status, STATUS_FALSE);
        assert!(find_condition(&conditions, "Degraded").is_none());
    }

    #[test]
    fn test_update_condition_preserves_transition_time_when_status_unchanged() {
        let mut conditions = vec![ready_condition("2025-01-01T00:00:00+00:00")];

        update_condition_in_memory(
            &mut conditions,
            CONDITION_TYPE_READY,
            STATUS_TRUE,
            "Reconciled",
            "Still good",
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions[0].last_transition_time.as_deref(),
            Some("2025-01-01T00:00:00+00:00")
        );
        assert_eq!(conditions[0].message.as_deref(), Some("Still good"));
    }

    #[test]
    fn test_update_condition_resets_transition_time_when_status_flips() {
        let mut conditions = vec![ready_condition("2025-01-01T00:00:00+00:00")];

        update_condition_in_memory(
            &mut conditions,
            CONDITION_TYPE_READY,
            STATUS_FALSE,
            "MissionNotFound",
            "gone",
        );

        assert_eq!(conditions[0].status, STATUS_FALSE);
        assert_ne!(
            conditions[0].last_transition_time.as_deref(),
            Some("2025-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_update_condition_appends_new_type() {
        let mut conditions = vec![];
        update_condition_in_memory(&mut conditions, CONDITION_TYPE_READY, STATUS_TRUE, "R", "m");
        assert_eq!(conditions.len(), 1);
    }

    #[test]
    fn test_conditions_equal_ignores_transition_time() {
        let a = vec![ready_condition("2025-01-01T00:00:00+00:00")];
        let b = vec![ready_condition("2026-06-01T00:00:00+00:00")];
        assert!(conditions_equal(&a, &b));

        let mut c = b.clone();
        c[0].message = Some("Different".to_string());
        assert!(!conditions_equal(&a, &c));
        assert!(!conditions_equal(&a, &[]));
    }

    #[test]
    fn test_updater_without_current_status_has_changes() {
        let mission = mission_with_status(None);
        let updater = StatusUpdater::new(&mission);
        assert!(updater.has_changes());
    }

    #[test]
    fn test_updater_rewriting_same_condition_has_no_changes() {
        let mission = mission_with_status(Some(MissionStatus {
            conditions: vec![ready_condition("2025-01-01T00:00:00+00:00")],
            observed_generation: Some(2),
            ..Default::default()
        }));

        let mut updater = StatusUpdater::new(&mission);
        updater.set_ready("Reconciled", "All good");
        updater.set_observed_generation(Some(2));

        assert!(!updater.has_changes());
    }

    #[test]
    fn test_updater_detects_field_changes() {
        let mission = mission_with_status(Some(MissionStatus {
            conditions: vec![ready_condition("2025-01-01T00:00:00+00:00")],
            observed_generation: Some(2),
            ..Default::default()
        }));

        let mut updater = StatusUpdater::new(&mission);
        updater.set_ready("Reconciled", "All good");
        updater.status_mut().package_status.insert(
            "provider-gcp-family".to_string(),
            MissionPackageStatus {
                installed: STATUS_TRUE.to_string(),
                healthy: STATUS_TRUE.to_string(),
            },
        );

        assert!(updater.has_changes());
    }

    #[test]
    fn test_updater_detects_generation_change() {
        let mission = mission_with_status(Some(MissionStatus {
            conditions: vec![ready_condition("2025-01-01T00:00:00+00:00")],
            observed_generation: Some(1),
            ..Default::default()
        }));

        let mut updater = StatusUpdater::new(&mission);
        updater.set_ready("Reconciled", "All good");
        updater.set_observed_generation(mission.metadata.generation);

        assert!(updater.has_changes());
    }

    #[test]
    fn test_is_ready() {
        let mut vm = VirtualMachine::new(
            "web",
            VirtualMachineSpec {
                mission_ref: VirtualMachineMissionRef::default(),
                for_provider: VirtualMachineParameters::default(),
            },
        );
        assert!(!is_ready(&vm));

        let mut updater = StatusUpdater::new(&vm);
        updater.set_ready("Reconciled", "ok");
        vm.status = Some(updater.status().clone());
        assert!(is_ready(&vm));

        let mut updater = StatusUpdater::new(&vm);
        updater.set_not_ready("MissionNotFound", "missing");
        vm.status = Some(updater.status().clone());
        assert!(!is_ready(&vm));
    }

    #[tokio::test]
    async fn test_finish_records_failure_and_returns_error() {
        use crate::errors::MissionError;
        use crate::reconcilers::test_support::{mock_client, persisted};
        use kube::Api;
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let mission = mission_with_status(None);

        Mock::given(method("PATCH"))
            .and(path(
                "/apis/mission.mission-control.apis.io/v1alpha1/missions/apollo/status",
            ))
            .and(body_partial_json(json!({
                "status": {
                    "observedGeneration": 2,
                    "conditions": [{
                        "type": "Ready",
                        "status": "False",
                        "reason": "CrossplaneNotInstalled"
                    }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(persisted(&mission, "2")))
            .expect(1)
            .mount(&server)
            .await;

        let api: Api<Mission> = Api::all(mock_client(&server));
        let mut updater = StatusUpdater::new(&mission);
        updater.set_observed_generation(mission.metadata.generation);
        let err = updater
            .finish(
                &api,
                Err(MissionError::CrossplaneNotInstalled {
                    crd: "providers.pkg.crossplane.io".to_string(),
                }
                .into()),
            )
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<MissionError>().is_some());
    }

    #[tokio::test]
    async fn test_finish_skips_patch_when_already_ready() {
        use crate::reconcilers::test_support::mock_client;
        use kube::Api;
        use wiremock::MockServer;

        let server = MockServer::start().await;
        let mut mission = mission_with_status(None);
        let mut updater = StatusUpdater::new(&mission);
        updater.set_ready("Reconciled", "1 ProviderConfig(s) reconciled");
        updater.set_observed_generation(mission.metadata.generation);
        mission.status = Some(updater.status().clone());

        // No mocks mounted: any request would fail with a 404
        let api: Api<Mission> = Api::all(mock_client(&server));
        let mut updater = StatusUpdater::new(&mission);
        updater.set_observed_generation(mission.metadata.generation);
        updater
            .finish(&api, Ok("1 ProviderConfig(s) reconciled".to_string()))
            .await
            .unwrap();
    }
}
