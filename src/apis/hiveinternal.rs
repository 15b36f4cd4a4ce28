//! `hiveinternal.openshift.io/v1alpha1` FakeClusterInstall

use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};

use super::hive::ConditionStatus;

/// FakeClusterInstall represents a fake request to install an OpenShift cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeClusterInstall {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: FakeClusterInstallSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FakeClusterInstallStatus>,
}

super::impl_resource!(
    FakeClusterInstall,
    FakeClusterInstallStatus,
    group = "hiveinternal.openshift.io",
    version = "v1alpha1",
    kind = "FakeClusterInstall",
    plural = "fakeclusterinstalls"
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FakeClusterInstallSpec {
    #[serde(default)]
    pub image_set_ref: ClusterImageSetReference,
    #[serde(default)]
    pub cluster_deployment_ref: LocalObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_metadata: Option<ClusterMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterImageSetReference {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetadata {
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    #[serde(rename = "infraID")]
    pub infra_id: String,
    pub admin_kubeconfig_secret_ref: LocalObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password_secret_ref: Option<LocalObjectReference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeClusterInstallStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ClusterInstallCondition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInstallCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}
