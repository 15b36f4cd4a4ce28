//! Options applicable to any object carrying standard Kubernetes metadata.

use crate::registry::ObjectTypeRegistry;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::TypeMeta;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// An object exposing standard metadata and optional type metadata.
pub trait GenericObject {
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn type_meta_mut(&mut self) -> &mut Option<TypeMeta>;

    /// Rust type of the concrete object, used for registry lookups.
    fn object_type(&self) -> TypeId;
}

/// A resource-agnostic mutation applied while building an object.
pub type GenericOption = Arc<dyn Fn(&mut dyn GenericObject) + Send + Sync>;

pub fn with_name(name: impl Into<String>) -> GenericOption {
    let name = name.into();
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut().name = Some(name.clone());
    })
}

pub fn with_namespace(namespace: impl Into<String>) -> GenericOption {
    let namespace = namespace.into();
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut().namespace = Some(namespace.clone());
    })
}

/// Sets a label, keeping any other labels already present.
pub fn with_label(key: impl Into<String>, value: impl Into<String>) -> GenericOption {
    let (key, value) = (key.into(), value.into());
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut()
            .labels
            .get_or_insert_with(Default::default)
            .insert(key.clone(), value.clone());
    })
}

/// Sets an annotation, keeping any other annotations already present.
pub fn with_annotation(key: impl Into<String>, value: impl Into<String>) -> GenericOption {
    let (key, value) = (key.into(), value.into());
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut()
            .annotations
            .get_or_insert_with(Default::default)
            .insert(key.clone(), value.clone());
    })
}

pub fn with_finalizer(finalizer: impl Into<String>) -> GenericOption {
    let finalizer = finalizer.into();
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut()
            .finalizers
            .get_or_insert_with(Vec::new)
            .push(finalizer.clone());
    })
}

pub fn with_resource_version(resource_version: impl Into<String>) -> GenericOption {
    let resource_version = resource_version.into();
    Arc::new(move |obj: &mut dyn GenericObject| {
        obj.meta_mut().resource_version = Some(resource_version.clone());
    })
}

/// Populates apiVersion and kind from the registry.
///
/// Objects whose type is not registered are left untouched.
pub fn with_type_meta(registry: &ObjectTypeRegistry) -> GenericOption {
    let registry = registry.clone();
    Arc::new(move |obj: &mut dyn GenericObject| {
        match registry.type_meta_for(obj.object_type()) {
            Some(types) => *obj.type_meta_mut() = Some(types),
            None => debug!("No type metadata registered for {:?}", obj.object_type()),
        }
    })
}
