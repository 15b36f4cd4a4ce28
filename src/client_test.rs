#[cfg(test)]
mod tests {
    use crate::action::{Action, PatchType};
    use crate::apis::hiveinternal::{ClusterInstallCondition, FakeClusterInstallStatus};
    use crate::apis::hive::ConditionStatus;
    use crate::apis::{self, ClusterDeployment, FakeClusterInstall};
    use crate::client::{FakeResourceClient, ResourceInterface, StatusInterface};
    use crate::clusterdeployment::{self, installed, with_label};
    use crate::fake::Fake;
    use crate::fake_builder::FakeBuilder;
    use crate::typed::{FakeHiveV1, FakeHiveinternalV1alpha1};
    use crate::Error;
    use futures::StreamExt;
    use kube::api::{DeleteParams, ListParams, PatchParams, PostParams, WatchParams};
    use kube::core::WatchEvent;
    use serde_json::json;
    use std::sync::Arc;

    fn install(name: &str) -> FakeClusterInstall {
        let mut fci = FakeClusterInstall::default();
        fci.metadata.name = Some(name.to_string());
        fci.spec.image_set_ref.name = "openshift-v4.14".to_string();
        fci
    }

    fn installs(fake: &Arc<Fake>) -> FakeResourceClient<FakeClusterInstall> {
        FakeHiveinternalV1alpha1::new(fake.clone()).fake_cluster_installs("hive")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let fake = FakeBuilder::new().build().unwrap();
        let client = installs(&fake);

        let created = client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        assert_eq!(created.metadata.resource_version.as_deref(), Some("1"));
        assert_eq!(created.metadata.namespace.as_deref(), Some("hive"));

        let types = created.types.clone().unwrap();
        assert_eq!(types.api_version, "hiveinternal.openshift.io/v1alpha1");
        assert_eq!(types.kind, "FakeClusterInstall");

        let got = client.get("fci-1").await.unwrap();
        assert_eq!(got, created);
    }

    #[tokio::test]
    async fn test_every_call_records_one_action() {
        let fake = FakeBuilder::new().build().unwrap();
        let client = installs(&fake);

        client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        client.get("fci-1").await.unwrap();
        client.list(&ListParams::default()).await.unwrap();
        client
            .delete("fci-1", &DeleteParams::default())
            .await
            .unwrap();

        let actions = fake.actions();
        let verbs: Vec<_> = actions.iter().map(|a| a.verb()).collect();
        assert_eq!(verbs, vec!["create", "get", "list", "delete"]);
        assert!(actions
            .iter()
            .all(|a| a.resource().resource == "fakeclusterinstalls" && a.namespace() == "hive"));
    }

    #[tokio::test]
    async fn test_list_applies_label_selector_in_stored_order() {
        let registry = apis::registry();
        let fake = FakeBuilder::new()
            .with_objects(vec![
                clusterdeployment::full_builder("hive", "cd-b", &registry)
                    .build([with_label("env", "prod")]),
                clusterdeployment::full_builder("hive", "cd-c", &registry)
                    .build([with_label("env", "dev")]),
                clusterdeployment::full_builder("hive", "cd-a", &registry)
                    .build([with_label("env", "prod"), installed()]),
            ])
            .build()
            .unwrap();
        let cds = FakeHiveV1::new(fake.clone()).cluster_deployments("hive");

        let prod = cds
            .list(&ListParams::default().labels("env=prod"))
            .await
            .unwrap();
        let names: Vec<_> = prod
            .items
            .iter()
            .map(|cd| cd.metadata.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["cd-b", "cd-a"]);
        assert_eq!(prod.types.kind, "ClusterDeploymentList");

        // The recorded action carries the selector
        match &fake.actions()[0] {
            Action::List { params, .. } => {
                assert_eq!(params.label_selector.as_deref(), Some("env=prod"))
            }
            other => panic!("unexpected action: {}", other),
        }
    }

    #[tokio::test]
    async fn test_list_keeps_reactor_list_metadata() {
        let fake = FakeBuilder::new()
            .with_reactor(
                "list",
                "fakeclusterinstalls",
                Arc::new(|_action: &Action| {
                    Ok(Some(json!({
                        "metadata": {"resourceVersion": "77", "continue": "token"},
                        "items": [
                            {"metadata": {"name": "a", "labels": {"env": "prod"}}},
                            {"metadata": {"name": "b"}}
                        ]
                    })))
                }),
            )
            .build()
            .unwrap();

        let list = installs(&fake)
            .list(&ListParams::default().labels("env=prod"))
            .await
            .unwrap();
        assert_eq!(list.metadata.resource_version.as_deref(), Some("77"));
        assert_eq!(list.metadata.continue_.as_deref(), Some("token"));
        assert_eq!(list.items.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_label_selector() {
        let fake = FakeBuilder::new().build().unwrap();
        let err = installs(&fake)
            .list(&ListParams::default().labels("env in prod"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(_)));
        assert_eq!(fake.actions().len(), 1);
    }

    #[tokio::test]
    async fn test_list_reactor_sees_invalid_label_selector() {
        let fake = FakeBuilder::new()
            .with_reactor(
                "list",
                "fakeclusterinstalls",
                Arc::new(|_action: &Action| Err(Error::Internal("list unavailable".to_string()))),
            )
            .build()
            .unwrap();

        let err = installs(&fake)
            .list(&ListParams::default().labels("env in prod"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(ref msg) if msg == "list unavailable"));
        assert_eq!(fake.actions()[0].verb(), "list");
    }

    #[tokio::test]
    async fn test_errors_pass_through_verbatim() {
        let fake = FakeBuilder::new()
            .with_reactor(
                "update",
                "fakeclusterinstalls",
                Arc::new(|_action: &Action| Err(Error::Conflict("try again".to_string()))),
            )
            .build()
            .unwrap();
        let client = installs(&fake);

        let err = client.get("missing").await.unwrap_err();
        assert!(err.is_not_found());

        client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        let err = client
            .update(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(ref msg) if msg == "try again"));

        let err = client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_reactor_answering_null_is_an_error() {
        let fake = FakeBuilder::new()
            .with_reactor(
                "get",
                "*",
                Arc::new(|_action: &Action| Ok(Some(serde_json::Value::Null))),
            )
            .build()
            .unwrap();

        let err = installs(&fake).get("fci-1").await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_update_and_update_status() {
        let fake = FakeBuilder::new()
            .with_status_subresource::<FakeClusterInstall>()
            .build()
            .unwrap();
        let client = installs(&fake);

        let mut fci = client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        fci.status = Some(FakeClusterInstallStatus {
            conditions: vec![ClusterInstallCondition {
                type_: "Completed".to_string(),
                status: ConditionStatus::True,
                last_probe_time: None,
                last_transition_time: None,
                reason: String::new(),
                message: String::new(),
            }],
        });

        // Ordinary update drops the status
        let updated = client.update(&PostParams::default(), &fci).await.unwrap();
        assert!(updated.status.is_none());

        let mut fci = updated;
        fci.status = Some(FakeClusterInstallStatus {
            conditions: vec![ClusterInstallCondition {
                type_: "Completed".to_string(),
                status: ConditionStatus::True,
                last_probe_time: None,
                last_transition_time: None,
                reason: "InstallSucceeded".to_string(),
                message: String::new(),
            }],
        });
        fci.spec.image_set_ref.name = "ignored".to_string();

        let updated = client
            .update_status(&PostParams::default(), &fci)
            .await
            .unwrap();
        assert_eq!(updated.spec.image_set_ref.name, "openshift-v4.14");
        assert_eq!(updated.status.unwrap().conditions[0].reason, "InstallSucceeded");

        let last = fake.actions().pop().unwrap();
        assert_eq!(last.verb(), "update");
        assert_eq!(last.subresource(), Some("status"));
    }

    #[tokio::test]
    async fn test_patch() {
        let fake = FakeBuilder::new().build().unwrap();
        let client = installs(&fake);
        client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();

        let patched = client
            .patch(
                "fci-1",
                &PatchParams::default(),
                PatchType::Merge,
                br#"{"spec": {"clusterDeploymentRef": {"name": "cd-1"}}}"#,
                &[],
            )
            .await
            .unwrap();
        assert_eq!(patched.spec.cluster_deployment_ref.name, "cd-1");
        assert_eq!(patched.spec.image_set_ref.name, "openshift-v4.14");

        let patched = client
            .patch(
                "fci-1",
                &PatchParams::default(),
                PatchType::Json,
                br#"[{"op": "replace", "path": "/spec/imageSetRef/name", "value": "openshift-v4.15"}]"#,
                &[],
            )
            .await
            .unwrap();
        assert_eq!(patched.spec.image_set_ref.name, "openshift-v4.15");

        match fake.actions().pop().unwrap() {
            Action::Patch { patch_type, .. } => assert_eq!(patch_type, PatchType::Json),
            other => panic!("unexpected action: {}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_and_delete_collection() {
        let fake = FakeBuilder::new().build().unwrap();
        let cds = FakeHiveV1::new(fake.clone()).cluster_deployments("hive");
        for (name, env) in [("cd-1", "prod"), ("cd-2", "dev"), ("cd-3", "prod")] {
            let cd = clusterdeployment::build([
                clusterdeployment::with_name(name),
                with_label("env", env),
            ]);
            cds.create(&PostParams::default(), &cd).await.unwrap();
        }

        cds.delete("cd-2", &DeleteParams::default()).await.unwrap();
        assert!(cds
            .delete("cd-2", &DeleteParams::default())
            .await
            .unwrap_err()
            .is_not_found());

        cds.delete_collection(
            &DeleteParams::default(),
            &ListParams::default().labels("env=prod"),
        )
        .await
        .unwrap();
        assert!(cds.list(&ListParams::default()).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_watch_streams_typed_events() {
        let fake = FakeBuilder::new().build().unwrap();
        let client = installs(&fake);

        let mut events = client.watch(&WatchParams::default(), "0").await.unwrap();
        client
            .create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        client
            .delete("fci-1", &DeleteParams::default())
            .await
            .unwrap();

        match events.next().await.unwrap().unwrap() {
            WatchEvent::Added(fci) => assert_eq!(fci.metadata.name.as_deref(), Some("fci-1")),
            other => panic!("unexpected event: {:?}", other),
        }
        match events.next().await.unwrap().unwrap() {
            WatchEvent::Deleted(fci) => assert_eq!(fci.spec.image_set_ref.name, "openshift-v4.14"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(fake.actions()[0].verb(), "watch");
    }

    #[tokio::test]
    async fn test_clients_share_the_fixture() {
        let fake = FakeBuilder::new().build().unwrap();
        let hive = installs(&fake);
        let other = FakeHiveinternalV1alpha1::new(fake.clone()).fake_cluster_installs("other");

        hive.create(&PostParams::default(), &install("fci-1"))
            .await
            .unwrap();
        assert!(other.get("fci-1").await.unwrap_err().is_not_found());
        assert_eq!(other.namespace(), "other");

        let cd: ClusterDeployment = clusterdeployment::build([clusterdeployment::with_name("cd-1")]);
        FakeHiveV1::new(fake.clone())
            .cluster_deployments("hive")
            .create(&PostParams::default(), &cd)
            .await
            .unwrap();
        assert_eq!(fake.actions().len(), 3);
    }
}
