//! `hive.openshift.io/v1` ClusterDeployment

use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::core::TypeMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label carrying the `major.minor.patch` version of an installed cluster.
pub const VERSION_MAJOR_MINOR_PATCH_LABEL: &str = "hive.openshift.io/version-major-minor-patch";

/// Annotation recording the hash of the ClusterPool spec a cluster was created from.
pub const CLUSTER_DEPLOYMENT_POOL_SPEC_HASH_ANNOTATION: &str =
    "hive.openshift.io/cluster-pool-spec-hash";

/// ClusterDeployment is the Schema for the clusterdeployments API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterDeployment {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ClusterDeploymentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterDeploymentStatus>,
}

super::impl_resource!(
    ClusterDeployment,
    ClusterDeploymentStatus,
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeployment",
    plural = "clusterdeployments"
);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_domain: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secret_ref: Option<LocalObjectReference>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preserve_on_delete: bool,
    #[serde(default)]
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_pool_ref: Option<ClusterPoolReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_state: Option<ClusterPowerState>,
    /// Go duration text, e.g. `8h0m0s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hibernate_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_management: Option<MachineManagement>,
}

/// Cloud platform configuration. Only one member is expected to be set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzurePlatform>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsPlatform {
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpPlatform {
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzurePlatform {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub base_domain_resource_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_ref: Option<LocalObjectReference>,
}

/// Reference from a ClusterDeployment to the ClusterPool that created it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPoolReference {
    pub namespace: String,
    pub pool_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub claim_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_timestamp: Option<Time>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterPowerState {
    Running,
    Hibernating,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineManagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central: Option<CentralMachineManagement>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_namespace: String,
}

/// Marker enabling machine management from the hub cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralMachineManagement {}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentStatus {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub install_restarts: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ClusterDeploymentCondition>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentCondition {
    #[serde(rename = "type")]
    pub type_: ClusterDeploymentConditionType,
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

impl ClusterDeploymentCondition {
    pub fn new(type_: ClusterDeploymentConditionType, status: ConditionStatus) -> Self {
        Self {
            type_,
            status,
            last_probe_time: None,
            last_transition_time: None,
            reason: String::new(),
            message: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterDeploymentConditionType {
    ClusterImageSetNotFound,
    InstallerImageResolutionFailed,
    ControlPlaneCertificateNotFound,
    IngressCertificateNotFound,
    Unreachable,
    ActiveAPIURLOverride,
    DNSNotReady,
    InstallImagesNotResolved,
    ProvisionFailed,
    SyncSetFailed,
    RelocationFailed,
    Hibernating,
    Ready,
    InstallLaunchError,
    DeprovisionLaunchError,
    ProvisionStopped,
    Provisioned,
    RequirementsMet,
    AuthenticationFailure,
    AWSPrivateLinkReady,
    AWSPrivateLinkFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}
