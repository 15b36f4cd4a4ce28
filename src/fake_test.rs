#[cfg(test)]
mod tests {
    use crate::action::{Action, PatchType};
    use crate::fake::Fake;
    use crate::tracker::{GVK, GVR};
    use crate::watch::FakeWatcher;
    use crate::Error;
    use kube::api::{DeleteParams, ListParams, WatchParams};
    use kube::core::WatchEvent;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gvr() -> GVR {
        GVR::new("hiveinternal.openshift.io", "v1alpha1", "fakeclusterinstalls")
    }

    fn gvk() -> GVK {
        GVK::new("hiveinternal.openshift.io", "v1alpha1", "FakeClusterInstall")
    }

    fn install(name: &str, labels: Value) -> Value {
        json!({
            "apiVersion": "hiveinternal.openshift.io/v1alpha1",
            "kind": "FakeClusterInstall",
            "metadata": {"name": name, "namespace": "hive", "labels": labels},
            "spec": {"imageSetRef": {"name": "openshift-v4.14"}}
        })
    }

    #[test]
    fn test_default_chain_serves_from_tracker() {
        let fake = Fake::new();
        fake.invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap();

        let got = fake.invokes(Action::get(gvr(), "hive", "fci-1")).unwrap();
        assert_eq!(got["metadata"]["resourceVersion"], "1");

        let err = fake
            .invokes(Action::get(gvr(), "hive", "missing"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_actions_are_recorded_in_order() {
        let fake = Fake::new();
        fake.invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap();
        let _ = fake.invokes(Action::get(gvr(), "hive", "missing"));
        fake.invokes(Action::delete(
            gvr(),
            "hive",
            "fci-1",
            DeleteParams::default(),
        ))
        .unwrap();

        let verbs: Vec<_> = fake.actions().iter().map(|a| a.verb()).collect();
        assert_eq!(verbs, vec!["create", "get", "delete"]);

        fake.clear_actions();
        assert!(fake.actions().is_empty());
    }

    #[test]
    fn test_prepended_reactor_injects_error() {
        let fake = Fake::new();
        fake.prepend_reactor(
            "create",
            "fakeclusterinstalls",
            Arc::new(|_action: &Action| Err(Error::Internal("boom".to_string()))),
        );

        let err = fake
            .invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap_err();
        assert!(matches!(err, Error::Internal(ref msg) if msg == "boom"));

        // The failed call is still recorded and nothing was stored
        assert_eq!(fake.actions().len(), 1);
        assert!(fake.tracker().list(&gvr(), Some("hive")).unwrap().is_empty());
    }

    #[test]
    fn test_passing_reactor_falls_through() {
        let fake = Fake::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        fake.prepend_reactor(
            "*",
            "*",
            Arc::new(move |_action: &Action| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }),
        );

        fake.invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap();
        fake.invokes(Action::get(gvr(), "hive", "fci-1")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_appended_reactor_is_shadowed_by_tracker() {
        let fake = Fake::new();
        fake.add_reactor(
            "get",
            "*",
            Arc::new(|_action: &Action| Ok(Some(json!({"shadowed": true})))),
        );

        let err = fake
            .invokes(Action::get(gvr(), "hive", "fci-1"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_reactor_only_matches_its_resource() {
        let fake = Fake::new();
        fake.prepend_reactor(
            "get",
            "clusterdeployments",
            Arc::new(|_action: &Action| Ok(Some(json!({"metadata": {"name": "canned"}})))),
        );

        assert!(fake
            .invokes(Action::get(gvr(), "hive", "fci-1"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_list_filters_by_field_selector_only() {
        let fake = Fake::new();
        for (name, env) in [("fci-1", "prod"), ("fci-2", "dev")] {
            fake.invokes(Action::create(gvr(), "hive", install(name, json!({"env": env}))))
                .unwrap();
        }

        let list = fake
            .invokes(Action::list(
                gvr(),
                gvk(),
                "hive",
                ListParams::default().labels("env=prod"),
            ))
            .unwrap();
        assert_eq!(list["kind"], "FakeClusterInstallList");
        assert_eq!(list["apiVersion"], "hiveinternal.openshift.io/v1alpha1");
        assert_eq!(list["items"].as_array().unwrap().len(), 2);

        let list = fake
            .invokes(Action::list(
                gvr(),
                gvk(),
                "hive",
                ListParams::default().fields("metadata.name=fci-2"),
            ))
            .unwrap();
        let items = list["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["metadata"]["name"], "fci-2");
    }

    #[test]
    fn test_delete_collection_removes_matching_objects() {
        let fake = Fake::new();
        for (name, env) in [("fci-1", "prod"), ("fci-2", "dev"), ("fci-3", "prod")] {
            fake.invokes(Action::create(gvr(), "hive", install(name, json!({"env": env}))))
                .unwrap();
        }

        let deleted = fake
            .invokes(Action::delete_collection(
                gvr(),
                "hive",
                ListParams::default().labels("env=prod"),
            ))
            .unwrap();
        assert_eq!(deleted.as_array().unwrap().len(), 2);

        let remaining = fake.tracker().list(&gvr(), Some("hive")).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["metadata"]["name"], "fci-2");
    }

    #[test]
    fn test_status_update_action() {
        let fake = Fake::new();
        fake.tracker().add_status_subresource(gvr());
        fake.invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap();

        let mut obj = fake.invokes(Action::get(gvr(), "hive", "fci-1")).unwrap();
        obj["spec"]["imageSetRef"]["name"] = json!("ignored");
        obj["status"] = json!({"conditions": [{"type": "Completed", "status": "True"}]});

        let updated = fake
            .invokes(Action::update_subresource(gvr(), "status", "hive", obj))
            .unwrap();
        assert_eq!(updated["spec"]["imageSetRef"]["name"], "openshift-v4.14");
        assert_eq!(updated["status"]["conditions"][0]["type"], "Completed");
        assert_eq!(fake.actions()[2].subresource(), Some("status"));
    }

    #[test]
    fn test_patch_action_keeps_first_subresource() {
        let action = Action::patch(
            gvr(),
            "hive",
            "fci-1",
            PatchType::Merge,
            b"{}",
            &["status", "scale"],
        );
        assert_eq!(action.subresource(), Some("status"));
        assert_eq!(
            action.to_string(),
            "patch fakeclusterinstalls/status in namespace hive (fci-1)"
        );
    }

    #[tokio::test]
    async fn test_default_watch_reaction_follows_tracker() {
        let fake = Fake::new();
        let mut events = fake
            .invokes_watch(Action::watch(gvr(), "hive", WatchParams::default(), ""))
            .unwrap();

        fake.invokes(Action::create(gvr(), "hive", install("fci-1", json!({}))))
            .unwrap();

        match events.recv().await.unwrap() {
            WatchEvent::Added(obj) => assert_eq!(obj["metadata"]["name"], "fci-1"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(fake.actions()[0].verb(), "watch");
    }

    #[tokio::test]
    async fn test_prepended_watch_reactor_scripts_events() {
        let fake = Fake::new();
        let (watcher, events) = FakeWatcher::new();
        let events = std::sync::Mutex::new(Some(events));
        fake.prepend_watch_reactor(
            "fakeclusterinstalls",
            Arc::new(move |_action: &Action| Ok(events.lock().unwrap().take())),
        );

        let mut received = fake
            .invokes_watch(Action::watch(gvr(), "hive", WatchParams::default(), ""))
            .unwrap();
        watcher.add(&install("scripted", json!({}))).unwrap();

        match received.recv().await.unwrap() {
            WatchEvent::Added(obj) => assert_eq!(obj["metadata"]["name"], "scripted"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
