//! Fake clientsets for the hive API groups, one accessor per resource

use crate::apis::{ClusterDeployment, FakeClusterInstall};
use crate::client::FakeResourceClient;
use crate::fake::Fake;
use std::sync::Arc;

/// Fake client for the `hiveinternal.openshift.io/v1alpha1` group.
#[derive(Clone)]
pub struct FakeHiveinternalV1alpha1 {
    pub fake: Arc<Fake>,
}

impl FakeHiveinternalV1alpha1 {
    pub fn new(fake: Arc<Fake>) -> Self {
        Self { fake }
    }

    pub fn fake_cluster_installs(&self, namespace: &str) -> FakeResourceClient<FakeClusterInstall> {
        FakeResourceClient::new(self.fake.clone(), namespace)
    }
}

/// Fake client for the `hive.openshift.io/v1` group.
#[derive(Clone)]
pub struct FakeHiveV1 {
    pub fake: Arc<Fake>,
}

impl FakeHiveV1 {
    pub fn new(fake: Arc<Fake>) -> Self {
        Self { fake }
    }

    pub fn cluster_deployments(&self, namespace: &str) -> FakeResourceClient<ClusterDeployment> {
        FakeResourceClient::new(self.fake.clone(), namespace)
    }
}
