//! Builder for seeding and configuring a [`Fake`] fixture

use crate::apis;
use crate::fake::Fake;
use crate::reactor::{ReactionFunc, WatchReactionFunc};
use crate::registry::{metadata_of, ObjectTypeRegistry};
use crate::tracker::{GVK, GVR};
use crate::{Error, Result};
use kube::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Builder for creating seeded fixtures
///
/// Provides a fluent API for:
/// - Initial objects, typed or as raw JSON
/// - YAML fixture files
/// - Status subresources
/// - Custom reactors, consulted before the tracker
///
/// # Example
///
/// ```rust
/// use hive_testing::apis::ClusterDeployment;
/// use hive_testing::FakeBuilder;
/// use hive_testing::clusterdeployment::{self, installed};
///
/// let cd = clusterdeployment::build([
///     clusterdeployment::with_name("cd-1"),
///     clusterdeployment::with_namespace("hive"),
///     installed(),
/// ]);
///
/// let fake = FakeBuilder::new()
///     .with_object(cd)
///     .build()
///     .unwrap();
/// let gvr = hive_testing::registry::metadata_of::<ClusterDeployment>().gvr();
/// assert_eq!(fake.tracker().list(&gvr, Some("hive")).unwrap().len(), 1);
/// ```
pub struct FakeBuilder {
    registry: ObjectTypeRegistry,
    initial_objects: Vec<Value>,
    with_status_subresource: Vec<GVR>,
    fixture_dir: Option<PathBuf>,
    reactors: Vec<(String, String, ReactionFunc)>,
    watch_reactors: Vec<(String, WatchReactionFunc)>,
    seed_error: Option<Error>,
}

impl FakeBuilder {
    /// A builder that knows every hive resource type.
    pub fn new() -> Self {
        Self {
            registry: apis::registry(),
            initial_objects: Vec::new(),
            with_status_subresource: Vec::new(),
            fixture_dir: None,
            reactors: Vec::new(),
            watch_reactors: Vec::new(),
            seed_error: None,
        }
    }

    /// Resolve seeded objects through `registry` instead of the hive defaults.
    pub fn with_registry(mut self, registry: ObjectTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Seed a typed object; its type is registered if it wasn't already.
    ///
    /// `apiVersion` and `kind` are filled in from the type when the object
    /// does not carry them.
    pub fn with_object<K>(mut self, obj: K) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize + 'static,
        K::Scope: 'static,
    {
        self.registry.register::<K>();
        match serde_json::to_value(&obj) {
            Ok(mut value) => {
                let gvk = metadata_of::<K>().gvk();
                if value.get("apiVersion").is_none_or(Value::is_null) {
                    value["apiVersion"] = Value::String(gvk.api_version());
                }
                if value.get("kind").is_none_or(Value::is_null) {
                    value["kind"] = Value::String(gvk.kind);
                }
                self.initial_objects.push(value);
            }
            Err(e) => self.record_error(e.into()),
        }
        self
    }

    pub fn with_objects<K>(self, objects: impl IntoIterator<Item = K>) -> Self
    where
        K: Resource<DynamicType = ()> + Serialize + 'static,
        K::Scope: 'static,
    {
        objects.into_iter().fold(self, |builder, obj| builder.with_object(obj))
    }

    /// Seed raw objects; each must carry `apiVersion` and `kind` of a registered type.
    pub fn with_runtime_objects(mut self, objects: Vec<Value>) -> Self {
        self.initial_objects.extend(objects);
        self
    }

    /// Enable the status subresource for `K`
    ///
    /// With it enabled:
    /// - ordinary updates keep the stored status
    /// - status updates keep the stored spec and metadata
    pub fn with_status_subresource<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()> + 'static,
        K::Scope: 'static,
    {
        self.registry.register::<K>();
        self.with_status_subresource.push(metadata_of::<K>().gvr());
        self
    }

    /// Base directory for relative `load_fixture` paths.
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Load objects from a YAML fixture file
    ///
    /// Single and multi-document (`---` separated) files are supported; empty
    /// documents are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a document is not valid YAML.
    pub fn load_fixture(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let fixture_path = match &self.fixture_dir {
            Some(dir) => dir.join(path),
            None => path.as_ref().to_path_buf(),
        };

        let content = std::fs::read_to_string(&fixture_path).map_err(|e| {
            Error::Internal(format!(
                "Failed to read fixture file {:?}: {}",
                fixture_path, e
            ))
        })?;

        for document in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(document).map_err(|e| {
                Error::Internal(format!("Failed to parse YAML in {:?}: {}", fixture_path, e))
            })?;
            if !value.is_null() {
                self.initial_objects.push(value);
            }
        }

        debug!("Loaded fixture {:?}", fixture_path);
        Ok(self)
    }

    pub fn load_fixtures<P>(mut self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        for path in paths {
            self = self.load_fixture(path)?;
        }
        Ok(self)
    }

    /// Add a reactor that runs ahead of the tracker, in the order reactors were added.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hive_testing::action::Action;
    /// use hive_testing::{Error, FakeBuilder};
    /// use std::sync::Arc;
    ///
    /// let fake = FakeBuilder::new()
    ///     .with_reactor("create", "fakeclusterinstalls", Arc::new(|_action: &Action| {
    ///         Err(Error::Internal("injected".into()))
    ///     }))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn with_reactor(mut self, verb: &str, resource: &str, reaction: ReactionFunc) -> Self {
        self.reactors
            .push((verb.to_string(), resource.to_string(), reaction));
        self
    }

    pub fn with_watch_reactor(mut self, resource: &str, reaction: WatchReactionFunc) -> Self {
        self.watch_reactors.push((resource.to_string(), reaction));
        self
    }

    /// Build the fixture and seed it.
    ///
    /// Seeded objects are added rather than created, so their resourceVersion
    /// is kept and defaults to `999`.
    ///
    /// # Errors
    ///
    /// Returns an error if an object could not be serialized, names an
    /// unregistered kind, or is rejected by the tracker.
    pub fn build(self) -> Result<Arc<Fake>> {
        if let Some(err) = self.seed_error {
            return Err(err);
        }

        let fake = Fake::new();

        for gvr in self.with_status_subresource {
            fake.tracker().add_status_subresource(gvr);
        }

        for (verb, resource, reaction) in self.reactors.into_iter().rev() {
            fake.prepend_reactor(&verb, &resource, reaction);
        }
        for (resource, reaction) in self.watch_reactors.into_iter().rev() {
            fake.prepend_watch_reactor(&resource, reaction);
        }

        for obj in self.initial_objects {
            let gvk = GVK::from_object(&obj)?;
            let metadata = self
                .registry
                .lookup_by_kind(&gvk.group, &gvk.version, &gvk.kind)
                .ok_or_else(|| {
                    Error::InvalidRequest(format!(
                        "no resource registered for {}, Kind={}",
                        gvk.api_version(),
                        gvk.kind
                    ))
                })?;
            let namespace = if metadata.namespaced {
                extract_namespace(&obj)
            } else {
                String::new()
            };

            fake.tracker()
                .add(&metadata.gvr(), obj, &namespace)
                .map_err(|e| Error::Internal(format!("Failed to add initial object: {}", e)))?;
        }

        Ok(Arc::new(fake))
    }

    fn record_error(&mut self, err: Error) {
        if self.seed_error.is_none() {
            self.seed_error = Some(err);
        }
    }
}

impl Default for FakeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_namespace(obj: &Value) -> String {
    obj.get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(|n| n.as_str())
        .unwrap_or("default")
        .to_string()
}
