//! Options for building [`ClusterDeployment`] fixtures.

use crate::apis::hive::{
    AwsPlatform, AzurePlatform, CentralMachineManagement, ClusterDeploymentCondition,
    ClusterDeploymentConditionType, ClusterPoolReference, ClusterPowerState, ConditionStatus,
    GcpPlatform, MachineManagement, CLUSTER_DEPLOYMENT_POOL_SPEC_HASH_ANNOTATION,
    VERSION_MAJOR_MINOR_PATCH_LABEL,
};
use crate::apis::ClusterDeployment;
use crate::generic::{self, GenericOption};
use crate::object_builder::{self, BuildOption, Builder};
use crate::registry::ObjectTypeRegistry;
use crate::utils::{format_duration, now};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::sync::Arc;
use std::time::Duration;

pub type ClusterDeploymentOption = BuildOption<ClusterDeployment>;

/// Build a ClusterDeployment from the given options.
pub fn build<I>(opts: I) -> ClusterDeployment
where
    I: IntoIterator<Item = ClusterDeploymentOption>,
{
    object_builder::build(opts)
}

pub fn basic_builder() -> Builder<ClusterDeployment> {
    Builder::basic()
}

pub fn full_builder(
    namespace: impl Into<String>,
    name: impl Into<String>,
    registry: &ObjectTypeRegistry,
) -> Builder<ClusterDeployment> {
    Builder::full(namespace, name, registry)
}

/// Use a resource-agnostic option when building a ClusterDeployment.
pub fn generic(opt: GenericOption) -> ClusterDeploymentOption {
    object_builder::generic(opt)
}

pub fn with_name(name: impl Into<String>) -> ClusterDeploymentOption {
    generic(generic::with_name(name))
}

pub fn with_namespace(namespace: impl Into<String>) -> ClusterDeploymentOption {
    generic(generic::with_namespace(namespace))
}

pub fn with_label(key: impl Into<String>, value: impl Into<String>) -> ClusterDeploymentOption {
    generic(generic::with_label(key, value))
}

pub fn with_finalizer(finalizer: impl Into<String>) -> ClusterDeploymentOption {
    generic(generic::with_finalizer(finalizer))
}

pub fn with_annotation(
    key: impl Into<String>,
    value: impl Into<String>,
) -> ClusterDeploymentOption {
    generic(generic::with_annotation(key, value))
}

/// Sets the cluster pool spec hash annotation.
pub fn with_pool_version(pool_version: impl Into<String>) -> ClusterDeploymentOption {
    with_annotation(CLUSTER_DEPLOYMENT_POOL_SPEC_HASH_ANNOTATION, pool_version)
}

/// Replaces the condition of the same type, or appends it.
pub fn with_condition(cond: ClusterDeploymentCondition) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| {
        let conditions = &mut cd.status.get_or_insert_with(Default::default).conditions;
        match conditions.iter_mut().find(|c| c.type_ == cond.type_) {
            Some(existing) => *existing = cond.clone(),
            None => conditions.push(cond.clone()),
        }
    })
}

/// ProvisionStopped=True marks the ClusterDeployment as broken.
pub fn broken() -> ClusterDeploymentOption {
    with_condition(ClusterDeploymentCondition::new(
        ClusterDeploymentConditionType::ProvisionStopped,
        ConditionStatus::True,
    ))
}

pub fn with_unclaimed_cluster_pool_reference(
    namespace: impl Into<String>,
    pool_name: impl Into<String>,
) -> ClusterDeploymentOption {
    with_cluster_pool_reference(namespace, pool_name, "")
}

/// Sets the pool reference and stamps the claim time with the current time,
/// even when `claim_name` is empty.
pub fn with_cluster_pool_reference(
    namespace: impl Into<String>,
    pool_name: impl Into<String>,
    claim_name: impl Into<String>,
) -> ClusterDeploymentOption {
    let (namespace, pool_name, claim_name) = (namespace.into(), pool_name.into(), claim_name.into());
    Arc::new(move |cd: &mut ClusterDeployment| {
        cd.spec.cluster_pool_ref = Some(ClusterPoolReference {
            namespace: namespace.clone(),
            pool_name: pool_name.clone(),
            claim_name: claim_name.clone(),
            claimed_timestamp: Some(now()),
        });
    })
}

pub fn preserve_on_delete() -> ClusterDeploymentOption {
    Arc::new(|cd: &mut ClusterDeployment| cd.spec.preserve_on_delete = true)
}

pub fn installed() -> ClusterDeploymentOption {
    Arc::new(|cd: &mut ClusterDeployment| cd.spec.installed = true)
}

/// Marks the cluster installed at `installed_at`.
pub fn installed_timestamp(installed_at: DateTime<Utc>) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| {
        cd.spec.installed = true;
        cd.status.get_or_insert_with(Default::default).installed_timestamp =
            Some(Time(installed_at));
    })
}

pub fn install_restarts(restarts: i32) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| {
        cd.status.get_or_insert_with(Default::default).install_restarts = restarts;
    })
}

pub fn with_cluster_version(version: impl Into<String>) -> ClusterDeploymentOption {
    with_label(VERSION_MAJOR_MINOR_PATCH_LABEL, version)
}

pub fn with_power_state(power_state: ClusterPowerState) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| cd.spec.power_state = Some(power_state))
}

pub fn with_hibernate_after(dur: Duration) -> ClusterDeploymentOption {
    let hibernate_after = format_duration(dur);
    Arc::new(move |cd: &mut ClusterDeployment| {
        cd.spec.hibernate_after = Some(hibernate_after.clone());
    })
}

pub fn with_aws_platform(platform: AwsPlatform) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| cd.spec.platform.aws = Some(platform.clone()))
}

pub fn with_gcp_platform(platform: GcpPlatform) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| cd.spec.platform.gcp = Some(platform.clone()))
}

pub fn with_azure_platform(platform: AzurePlatform) -> ClusterDeploymentOption {
    Arc::new(move |cd: &mut ClusterDeployment| cd.spec.platform.azure = Some(platform.clone()))
}

/// Enables central machine management, replacing any existing machine management.
pub fn with_central_machine_management() -> ClusterDeploymentOption {
    Arc::new(|cd: &mut ClusterDeployment| {
        cd.spec.machine_management = Some(MachineManagement {
            central: Some(CentralMachineManagement {}),
            ..Default::default()
        });
    })
}

/// Sets the machine management target namespace.
///
/// # Panics
///
/// Panics when applied before [`with_central_machine_management`].
pub fn with_target_namespace(target_namespace: impl Into<String>) -> ClusterDeploymentOption {
    let target_namespace = target_namespace.into();
    Arc::new(move |cd: &mut ClusterDeployment| {
        let machine_management = cd.spec.machine_management.as_mut().expect(
            "with_target_namespace requires with_central_machine_management to be applied first",
        );
        machine_management.target_namespace = target_namespace.clone();
    })
}

pub fn with_pull_secret_ref(pull_secret: impl Into<String>) -> ClusterDeploymentOption {
    let pull_secret = pull_secret.into();
    Arc::new(move |cd: &mut ClusterDeployment| {
        cd.spec.pull_secret_ref = Some(LocalObjectReference {
            name: pull_secret.clone(),
        });
    })
}
