//! Resource types served by the hive operator

/// Implements `kube::Resource`, `HasStatus` and `GenericObject` for a
/// namespaced type shaped as `types`/`metadata`/`spec`/`status`.
macro_rules! impl_resource {
    ($ty:ty, $status:ty, group = $group:literal, version = $version:literal, kind = $kind:literal, plural = $plural:literal) => {
        impl kube::Resource for $ty {
            type DynamicType = ();
            type Scope = k8s_openapi::NamespaceResourceScope;

            fn kind(_: &()) -> std::borrow::Cow<'_, str> {
                $kind.into()
            }

            fn group(_: &()) -> std::borrow::Cow<'_, str> {
                $group.into()
            }

            fn version(_: &()) -> std::borrow::Cow<'_, str> {
                $version.into()
            }

            fn plural(_: &()) -> std::borrow::Cow<'_, str> {
                $plural.into()
            }

            fn meta(&self) -> &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
                &self.metadata
            }

            fn meta_mut(&mut self) -> &mut k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
                &mut self.metadata
            }
        }

        impl kube::core::object::HasStatus for $ty {
            type Status = $status;

            fn status(&self) -> Option<&$status> {
                self.status.as_ref()
            }

            fn status_mut(&mut self) -> &mut Option<$status> {
                &mut self.status
            }
        }

        impl $crate::generic::GenericObject for $ty {
            fn meta_mut(&mut self) -> &mut k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
                &mut self.metadata
            }

            fn type_meta_mut(&mut self) -> &mut Option<kube::core::TypeMeta> {
                &mut self.types
            }

            fn object_type(&self) -> std::any::TypeId {
                std::any::TypeId::of::<$ty>()
            }
        }
    };
}

pub(crate) use impl_resource;

pub mod hive;
pub mod hiveinternal;

pub use hive::ClusterDeployment;
pub use hiveinternal::FakeClusterInstall;

use crate::registry::ObjectTypeRegistry;

/// Registry with every hive resource type registered.
pub fn registry() -> ObjectTypeRegistry {
    let registry = ObjectTypeRegistry::new();
    registry.register::<ClusterDeployment>();
    registry.register::<FakeClusterInstall>();
    registry
}
