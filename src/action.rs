//! Actions recorded by the fake fixture

use crate::tracker::{GVK, GVR};
use kube::api::{DeleteParams, ListParams, WatchParams};
use serde_json::Value;
use std::fmt;

/// Patch encodings accepted by the patch verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    /// RFC 6902 JSON Patch - application/json-patch+json
    Json,
    /// RFC 7386 JSON Merge Patch - application/merge-patch+json
    Merge,
    /// Kubernetes Strategic Merge Patch - application/strategic-merge-patch+json
    StrategicMerge,
    /// Server-Side Apply - application/apply-patch+yaml
    Apply,
}

impl PatchType {
    pub fn content_type(&self) -> &'static str {
        match self {
            PatchType::Json => "application/json-patch+json",
            PatchType::Merge => "application/merge-patch+json",
            PatchType::StrategicMerge => "application/strategic-merge-patch+json",
            PatchType::Apply => "application/apply-patch+yaml",
        }
    }
}

/// A single call made against the fixture.
#[derive(Debug, Clone)]
pub enum Action {
    Get {
        resource: GVR,
        namespace: String,
        name: String,
    },
    List {
        resource: GVR,
        kind: GVK,
        namespace: String,
        params: ListParams,
    },
    Watch {
        resource: GVR,
        namespace: String,
        params: WatchParams,
        resource_version: String,
    },
    Create {
        resource: GVR,
        namespace: String,
        subresource: Option<String>,
        object: Value,
    },
    Update {
        resource: GVR,
        namespace: String,
        subresource: Option<String>,
        object: Value,
    },
    Patch {
        resource: GVR,
        namespace: String,
        name: String,
        subresource: Option<String>,
        patch_type: PatchType,
        patch: Vec<u8>,
    },
    Delete {
        resource: GVR,
        namespace: String,
        name: String,
        params: DeleteParams,
    },
    DeleteCollection {
        resource: GVR,
        namespace: String,
        params: ListParams,
    },
}

impl Action {
    pub fn get(resource: GVR, namespace: &str, name: &str) -> Self {
        Action::Get {
            resource,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn list(resource: GVR, kind: GVK, namespace: &str, params: ListParams) -> Self {
        Action::List {
            resource,
            kind,
            namespace: namespace.to_string(),
            params,
        }
    }

    pub fn watch(resource: GVR, namespace: &str, params: WatchParams, version: &str) -> Self {
        Action::Watch {
            resource,
            namespace: namespace.to_string(),
            params,
            resource_version: version.to_string(),
        }
    }

    pub fn create(resource: GVR, namespace: &str, object: Value) -> Self {
        Action::Create {
            resource,
            namespace: namespace.to_string(),
            subresource: None,
            object,
        }
    }

    pub fn update(resource: GVR, namespace: &str, object: Value) -> Self {
        Action::Update {
            resource,
            namespace: namespace.to_string(),
            subresource: None,
            object,
        }
    }

    pub fn update_subresource(
        resource: GVR,
        subresource: &str,
        namespace: &str,
        object: Value,
    ) -> Self {
        Action::Update {
            resource,
            namespace: namespace.to_string(),
            subresource: Some(subresource.to_string()),
            object,
        }
    }

    /// A patch action; only the first subresource, if any, is kept.
    pub fn patch(
        resource: GVR,
        namespace: &str,
        name: &str,
        patch_type: PatchType,
        patch: &[u8],
        subresources: &[&str],
    ) -> Self {
        Action::Patch {
            resource,
            namespace: namespace.to_string(),
            name: name.to_string(),
            subresource: subresources.first().map(|s| s.to_string()),
            patch_type,
            patch: patch.to_vec(),
        }
    }

    pub fn delete(resource: GVR, namespace: &str, name: &str, params: DeleteParams) -> Self {
        Action::Delete {
            resource,
            namespace: namespace.to_string(),
            name: name.to_string(),
            params,
        }
    }

    pub fn delete_collection(resource: GVR, namespace: &str, params: ListParams) -> Self {
        Action::DeleteCollection {
            resource,
            namespace: namespace.to_string(),
            params,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Get { .. } => "get",
            Action::List { .. } => "list",
            Action::Watch { .. } => "watch",
            Action::Create { .. } => "create",
            Action::Update { .. } => "update",
            Action::Patch { .. } => "patch",
            Action::Delete { .. } => "delete",
            Action::DeleteCollection { .. } => "delete-collection",
        }
    }

    pub fn resource(&self) -> &GVR {
        match self {
            Action::Get { resource, .. }
            | Action::List { resource, .. }
            | Action::Watch { resource, .. }
            | Action::Create { resource, .. }
            | Action::Update { resource, .. }
            | Action::Patch { resource, .. }
            | Action::Delete { resource, .. }
            | Action::DeleteCollection { resource, .. } => resource,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Action::Get { namespace, .. }
            | Action::List { namespace, .. }
            | Action::Watch { namespace, .. }
            | Action::Create { namespace, .. }
            | Action::Update { namespace, .. }
            | Action::Patch { namespace, .. }
            | Action::Delete { namespace, .. }
            | Action::DeleteCollection { namespace, .. } => namespace,
        }
    }

    pub fn subresource(&self) -> Option<&str> {
        match self {
            Action::Create { subresource, .. }
            | Action::Update { subresource, .. }
            | Action::Patch { subresource, .. } => subresource.as_deref(),
            _ => None,
        }
    }

    /// Name of the targeted object, read from the payload for create and update.
    pub fn name(&self) -> Option<&str> {
        match self {
            Action::Get { name, .. } | Action::Patch { name, .. } | Action::Delete { name, .. } => {
                Some(name)
            }
            Action::Create { object, .. } | Action::Update { object, .. } => object
                .get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(|n| n.as_str()),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<&Value> {
        match self {
            Action::Create { object, .. } | Action::Update { object, .. } => Some(object),
            _ => None,
        }
    }

    /// True when verb and resource match; `*` matches anything.
    pub fn matches(&self, verb: &str, resource: &str) -> bool {
        (verb == "*" || verb == self.verb())
            && (resource == "*" || resource == self.resource().resource)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.resource().resource)?;
        if let Some(subresource) = self.subresource() {
            write!(f, "/{}", subresource)?;
        }
        if !self.namespace().is_empty() {
            write!(f, " in namespace {}", self.namespace())?;
        }
        if let Some(name) = self.name() {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}
