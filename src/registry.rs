//! Object-type registry
//!
//! Maps Rust resource types to their group, version, kind and plural, the way
//! a scheme does for API objects. Builders use it to stamp type metadata on
//! freshly built objects, and the fake fixture uses it to resolve the
//! group-version-resource of seeded objects.

use crate::tracker::{GVK, GVR};
use k8s_openapi::NamespaceResourceScope;
use kube::core::TypeMeta;
use kube::Resource;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Metadata for a registered resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub kind: String,
    pub group: String,
    pub version: String,
    pub plural: String,
    pub namespaced: bool,
}

impl ResourceMetadata {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.api_version(),
            kind: self.kind.clone(),
        }
    }

    pub fn gvk(&self) -> GVK {
        GVK::new(&self.group, &self.version, &self.kind)
    }

    pub fn gvr(&self) -> GVR {
        GVR::new(&self.group, &self.version, &self.plural)
    }
}

/// Registry of resource types.
///
/// Cloning is cheap; clones share the same underlying table.
#[derive(Debug, Clone, Default)]
pub struct ObjectTypeRegistry {
    resources: Arc<RwLock<HashMap<TypeId, ResourceMetadata>>>,
}

impl ObjectTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type using its Resource trait implementation
    pub fn register<K>(&self)
    where
        K: Resource<DynamicType = ()> + 'static,
        K::Scope: 'static,
    {
        let metadata = metadata_of::<K>();
        self.resources
            .write()
            .expect("ObjectTypeRegistry lock poisoned")
            .insert(TypeId::of::<K>(), metadata);
    }

    pub fn is_registered<K: 'static>(&self) -> bool {
        self.lookup_type(TypeId::of::<K>()).is_some()
    }

    pub fn lookup_type(&self, type_id: TypeId) -> Option<ResourceMetadata> {
        self.resources
            .read()
            .expect("ObjectTypeRegistry lock poisoned")
            .get(&type_id)
            .cloned()
    }

    /// Type metadata for the Rust type identified by `type_id`.
    pub fn type_meta_for(&self, type_id: TypeId) -> Option<TypeMeta> {
        self.lookup_type(type_id).map(|m| m.type_meta())
    }

    /// Look up a resource by (group, version, kind)
    pub fn lookup_by_kind(
        &self,
        group: &str,
        version: &str,
        kind: &str,
    ) -> Option<ResourceMetadata> {
        self.resources
            .read()
            .expect("ObjectTypeRegistry lock poisoned")
            .values()
            .find(|m| m.group == group && m.version == version && m.kind == kind)
            .cloned()
    }

    /// Resolve the resource for a group-version-kind, as found in `apiVersion`/`kind`.
    pub fn gvk_to_gvr(&self, gvk: &GVK) -> Option<GVR> {
        self.lookup_by_kind(&gvk.group, &gvk.version, &gvk.kind)
            .map(|m| m.gvr())
    }
}

/// Static metadata of a resource type; needs no registration.
pub fn metadata_of<K>() -> ResourceMetadata
where
    K: Resource<DynamicType = ()>,
    K::Scope: 'static,
{
    ResourceMetadata {
        kind: K::kind(&()).into_owned(),
        group: K::group(&()).into_owned(),
        version: K::version(&()).into_owned(),
        plural: K::plural(&()).into_owned(),
        namespaced: TypeId::of::<K::Scope>() == TypeId::of::<NamespaceResourceScope>(),
    }
}
