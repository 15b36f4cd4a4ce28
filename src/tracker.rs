use crate::action::PatchType;
use crate::utils::{
    deletion_timestamp_equal, ensure_metadata, increment_resource_version, now, should_be_deleted,
};
use crate::watch::{EventReceiver, EventSender};
use crate::{Error, Result};
use indexmap::IndexMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::WatchEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, trace};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GVR {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GVR {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GVK {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GVK {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Read the group-version-kind from an object's `apiVersion` and `kind`.
    pub fn from_object(value: &Value) -> Result<Self> {
        let api_version = value
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidRequest("Missing apiVersion".to_string()))?;

        let kind = value
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidRequest("Missing kind".to_string()))?;

        let (group, version) = match api_version.split_once('/') {
            Some((g, v)) => (g, v),
            None => ("", api_version),
        };

        Ok(GVK::new(group, version, kind))
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Value,
    pub metadata: ObjectMeta,
}

type ObjectsByName = IndexMap<String, StoredObject>;
type ObjectsByNamespace = IndexMap<String, ObjectsByName>;
type ObjectStorage = HashMap<GVR, ObjectsByNamespace>;

struct Watcher {
    namespace: String,
    sender: EventSender,
}

/// In-memory object store keyed by resource, namespace and name.
///
/// Objects keep their insertion order within a namespace. Every mutation is
/// broadcast to the live watchers of the same resource.
///
/// Mutations are serialized: the existence and resourceVersion checks, the
/// store and the watch notification of one mutation happen under a single
/// guard, so concurrent writers see `AlreadyExists` or `Conflict` and
/// watchers receive events in store order.
pub struct ObjectTracker {
    mutation: Mutex<()>,
    objects: RwLock<ObjectStorage>,
    with_status_subresource: RwLock<HashSet<GVR>>,
    watchers: Mutex<HashMap<GVR, Vec<Watcher>>>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self {
            mutation: Mutex::new(()),
            objects: RwLock::new(HashMap::new()),
            with_status_subresource: RwLock::new(HashSet::new()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_status_subresource(&self, gvr: GVR) {
        self.with_status_subresource
            .write()
            .expect("ObjectTracker lock poisoned")
            .insert(gvr);
    }

    pub fn has_status_subresource(&self, gvr: &GVR) -> bool {
        self.with_status_subresource
            .read()
            .expect("ObjectTracker lock poisoned")
            .contains(gvr)
    }

    /// Store an object as-is, replacing any object with the same name.
    ///
    /// Used for seeding; an existing resourceVersion is kept.
    pub fn add(&self, gvr: &GVR, mut object: Value, namespace: &str) -> Result<Value> {
        trace!("Adding object: {:?} in namespace: {}", gvr, namespace);

        let mut meta = extract_metadata(&object)?;
        let name = required_name(&meta)?;

        if meta.deletion_timestamp.is_some()
            && meta.finalizers.as_ref().is_none_or(|f| f.is_empty())
        {
            return Err(Error::InvalidRequest(format!(
                "refusing to add object {} with metadata.deletionTimestamp but no finalizers",
                name
            )));
        }

        if meta.resource_version.as_ref().is_none_or(|rv| rv.is_empty()) {
            meta.resource_version = Some("999".to_string());
        }

        ensure_metadata(&mut meta, namespace);
        object["metadata"] = serde_json::to_value(&meta)?;

        let _guard = self.lock_mutations();
        let replaced = self.store(gvr, namespace, &name, &object, meta);
        let event = if replaced {
            WatchEvent::Modified(object.clone())
        } else {
            WatchEvent::Added(object.clone())
        };
        self.notify(gvr, namespace, event);

        debug!("Added object: {}/{}", namespace, name);
        Ok(object)
    }

    pub fn create(&self, gvr: &GVR, mut object: Value, namespace: &str) -> Result<Value> {
        trace!("Creating object: {:?} in namespace: {}", gvr, namespace);

        let mut meta = extract_metadata(&object)?;
        let name = required_name(&meta)?;
        check_namespace(&meta, namespace)?;

        if meta
            .resource_version
            .as_ref()
            .is_some_and(|rv| !rv.is_empty())
        {
            return Err(Error::InvalidRequest(
                "resourceVersion can not be set for Create requests".to_string(),
            ));
        }

        let _guard = self.lock_mutations();
        if self.get(gvr, namespace, &name).is_ok() {
            return Err(Error::AlreadyExists {
                kind: gvr.resource.clone(),
                name,
                namespace: namespace.to_string(),
            });
        }

        meta.resource_version = Some("1".to_string());
        meta.deletion_timestamp = None;
        ensure_metadata(&mut meta, namespace);
        object["metadata"] = serde_json::to_value(&meta)?;

        self.store(gvr, namespace, &name, &object, meta);
        self.notify(gvr, namespace, WatchEvent::Added(object.clone()));

        debug!("Created object: {}/{}", namespace, name);
        Ok(object)
    }

    pub fn get(&self, gvr: &GVR, namespace: &str, name: &str) -> Result<Value> {
        trace!("Getting object: {:?} {}/{}", gvr, namespace, name);

        let objects = self.objects.read().expect("ObjectTracker lock poisoned");
        objects
            .get(gvr)
            .and_then(|by_ns| by_ns.get(namespace))
            .and_then(|by_name| by_name.get(name))
            .map(|stored| stored.data.clone())
            .ok_or_else(|| Error::not_found(&gvr.resource, namespace, name))
    }

    /// Replace a stored object.
    ///
    /// With the status subresource enabled for `gvr`, a status update keeps the
    /// stored spec and an ordinary update keeps the stored status.
    pub fn update(
        &self,
        gvr: &GVR,
        object: Value,
        namespace: &str,
        is_status: bool,
    ) -> Result<Value> {
        trace!("Updating object: {:?} in namespace: {}", gvr, namespace);

        let _guard = self.lock_mutations();
        self.update_locked(gvr, object, namespace, is_status)
    }

    fn update_locked(
        &self,
        gvr: &GVR,
        mut object: Value,
        namespace: &str,
        is_status: bool,
    ) -> Result<Value> {
        let meta = extract_metadata(&object)?;
        let name = required_name(&meta)?;
        check_namespace(&meta, namespace)?;

        let existing = self.get(gvr, namespace, &name)?;
        let existing_meta = extract_metadata(&existing)?;

        if let (Some(provided_rv), Some(current_rv)) =
            (&meta.resource_version, &existing_meta.resource_version)
        {
            if !provided_rv.is_empty() && provided_rv != current_rv {
                return Err(Error::Conflict(format!(
                    "Resource version mismatch: expected {}, got {}",
                    current_rv, provided_rv
                )));
            }
        }

        let status_subresource = self.has_status_subresource(gvr);
        if status_subresource {
            let keep = if is_status { "spec" } else { "status" };
            match existing.get(keep) {
                Some(value) => object[keep] = value.clone(),
                None => {
                    if let Some(obj) = object.as_object_mut() {
                        obj.remove(keep);
                    }
                }
            }
        }

        let new_rv =
            increment_resource_version(existing_meta.resource_version.as_deref().unwrap_or(""))?;

        let mut new_meta = if is_status && status_subresource {
            existing_meta.clone()
        } else {
            meta
        };
        new_meta.resource_version = Some(new_rv);
        new_meta.uid = existing_meta.uid.clone();
        new_meta.creation_timestamp = existing_meta.creation_timestamp.clone();
        new_meta.namespace = existing_meta.namespace.clone();

        if !deletion_timestamp_equal(
            &new_meta.deletion_timestamp,
            &existing_meta.deletion_timestamp,
        ) {
            return Err(Error::InvalidRequest(
                "metadata.deletionTimestamp field is immutable".to_string(),
            ));
        }

        object["metadata"] = serde_json::to_value(&new_meta)?;

        if should_be_deleted(&new_meta) {
            return self.remove_locked(gvr, namespace, &name);
        }

        self.store(gvr, namespace, &name, &object, new_meta);
        self.notify(gvr, namespace, WatchEvent::Modified(object.clone()));

        debug!("Updated object: {}/{}", namespace, name);
        Ok(object)
    }

    /// Apply a patch to a stored object and store the result.
    pub fn patch(
        &self,
        gvr: &GVR,
        namespace: &str,
        name: &str,
        patch_type: PatchType,
        patch: &[u8],
        is_status: bool,
    ) -> Result<Value> {
        trace!("Patching object: {:?} {}/{}", gvr, namespace, name);

        let _guard = self.lock_mutations();
        let existing = self.get(gvr, namespace, name)?;
        let mut patched = existing.clone();
        apply_patch(&mut patched, patch_type, patch)?;

        let patched_name = patched
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str());
        if patched_name != Some(name) {
            return Err(Error::InvalidRequest(
                "metadata.name field is immutable".to_string(),
            ));
        }

        self.update_locked(gvr, patched, namespace, is_status)
    }

    /// Delete an object.
    ///
    /// An object that still carries finalizers is only marked with a
    /// deletionTimestamp; it is removed once an update clears its finalizers.
    pub fn delete(&self, gvr: &GVR, namespace: &str, name: &str) -> Result<Value> {
        trace!("Deleting object: {:?} {}/{}", gvr, namespace, name);

        let _guard = self.lock_mutations();
        let existing = self.get(gvr, namespace, name)?;
        let mut meta = extract_metadata(&existing)?;
        if meta.finalizers.as_ref().is_none_or(Vec::is_empty) {
            return self.remove_locked(gvr, namespace, name);
        }
        if meta.deletion_timestamp.is_some() {
            return Ok(existing);
        }

        meta.deletion_timestamp = Some(now());
        meta.resource_version = Some(increment_resource_version(
            meta.resource_version.as_deref().unwrap_or(""),
        )?);
        let mut object = existing;
        object["metadata"] = serde_json::to_value(&meta)?;

        self.store(gvr, namespace, name, &object, meta);
        self.notify(gvr, namespace, WatchEvent::Modified(object.clone()));

        debug!("Marked object for deletion: {}/{}", namespace, name);
        Ok(object)
    }

    fn remove_locked(&self, gvr: &GVR, namespace: &str, name: &str) -> Result<Value> {
        let stored = {
            let mut objects = self.objects.write().expect("ObjectTracker lock poisoned");
            objects
                .get_mut(gvr)
                .and_then(|by_ns| by_ns.get_mut(namespace))
                .and_then(|by_name| by_name.shift_remove(name))
                .ok_or_else(|| Error::not_found(&gvr.resource, namespace, name))?
        };

        self.notify(gvr, namespace, WatchEvent::Deleted(stored.data.clone()));

        debug!("Deleted object: {}/{}", namespace, name);
        Ok(stored.data)
    }

    /// Objects of `gvr` in `namespace`, or in every namespace for `None`, in insertion order.
    pub fn list(&self, gvr: &GVR, namespace: Option<&str>) -> Result<Vec<Value>> {
        trace!("Listing objects: {:?} in namespace: {:?}", gvr, namespace);

        let objects = self.objects.read().expect("ObjectTracker lock poisoned");
        let Some(by_ns) = objects.get(gvr) else {
            return Ok(Vec::new());
        };

        let result = match namespace {
            Some(ns) => by_ns
                .get(ns)
                .map(|by_name| by_name.values().map(|s| s.data.clone()).collect())
                .unwrap_or_default(),
            None => by_ns
                .values()
                .flat_map(|by_name| by_name.values().map(|s| s.data.clone()))
                .collect(),
        };

        Ok(result)
    }

    /// Subscribe to changes of `gvr` in `namespace`; an empty namespace watches all.
    pub fn watch(&self, gvr: &GVR, namespace: &str) -> EventReceiver {
        trace!("Watching objects: {:?} in namespace: {}", gvr, namespace);

        let (sender, receiver) = mpsc::unbounded_channel();
        self.watchers
            .lock()
            .expect("ObjectTracker lock poisoned")
            .entry(gvr.clone())
            .or_default()
            .push(Watcher {
                namespace: namespace.to_string(),
                sender,
            });
        receiver
    }

    fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().expect("ObjectTracker lock poisoned")
    }

    fn store(
        &self,
        gvr: &GVR,
        namespace: &str,
        name: &str,
        object: &Value,
        metadata: ObjectMeta,
    ) -> bool {
        let stored = StoredObject {
            data: object.clone(),
            metadata,
        };

        let mut objects = self.objects.write().expect("ObjectTracker lock poisoned");
        objects
            .entry(gvr.clone())
            .or_default()
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), stored)
            .is_some()
    }

    fn notify(&self, gvr: &GVR, namespace: &str, event: WatchEvent<Value>) {
        let mut watchers = self.watchers.lock().expect("ObjectTracker lock poisoned");
        if let Some(watchers) = watchers.get_mut(gvr) {
            watchers.retain(|w| {
                if !w.namespace.is_empty() && w.namespace != namespace {
                    return !w.sender.is_closed();
                }
                w.sender.send(event.clone()).is_ok()
            });
        }
    }
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_metadata(object: &Value) -> Result<ObjectMeta> {
    let meta_value = object
        .get("metadata")
        .ok_or_else(|| Error::MetadataError("Object missing metadata field".to_string()))?;

    serde_json::from_value(meta_value.clone())
        .map_err(|e| Error::MetadataError(format!("Failed to parse metadata: {}", e)))
}

fn required_name(meta: &ObjectMeta) -> Result<String> {
    meta.name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))
}

fn check_namespace(meta: &ObjectMeta, namespace: &str) -> Result<()> {
    match meta.namespace.as_deref() {
        Some(ns) if !ns.is_empty() && !namespace.is_empty() && ns != namespace => {
            Err(Error::InvalidRequest(format!(
                "request namespace {} does not match object namespace {}",
                namespace, ns
            )))
        }
        _ => Ok(()),
    }
}

fn apply_patch(existing: &mut Value, patch_type: PatchType, data: &[u8]) -> Result<()> {
    match patch_type {
        PatchType::Json => {
            let patch: json_patch::Patch = serde_json::from_slice(data)?;
            json_patch::patch(existing, &patch)?;
        }
        // Strategic merge needs schema knowledge; merge semantics cover the common cases
        PatchType::Merge | PatchType::StrategicMerge => {
            let patch: Value = serde_json::from_slice(data)?;
            json_patch::merge(existing, &patch);
        }
        PatchType::Apply => {
            let patch: Value = serde_yaml::from_slice(data)?;
            json_patch::merge(existing, &patch);
        }
    }
    Ok(())
}
