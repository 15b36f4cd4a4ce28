//! Typed resource clients
//!
//! [`ResourceInterface`] is the surface controllers program against. It is
//! implemented both by `kube::Api<K>` and by [`FakeResourceClient<K>`], which
//! records every call on a [`Fake`] fixture and decodes whatever the fixture
//! answers.
//!
//! ```rust
//! use hive_testing::client::ResourceInterface;
//! use hive_testing::typed::FakeHiveinternalV1alpha1;
//! use hive_testing::apis::FakeClusterInstall;
//! use hive_testing::FakeBuilder;
//! use kube::api::PostParams;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fake = FakeBuilder::new().build()?;
//! let installs = FakeHiveinternalV1alpha1::new(fake.clone()).fake_cluster_installs("hive");
//!
//! let mut install = FakeClusterInstall::default();
//! install.metadata.name = Some("install-1".to_string());
//! installs.create(&PostParams::default(), &install).await?;
//!
//! assert_eq!(fake.actions().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::action::{Action, PatchType};
use crate::fake::Fake;
use crate::label_selector::{matches_labels, parse_label_selector};
use crate::registry::{metadata_of, ResourceMetadata};
use crate::watch::Watch;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::api::{
    DeleteParams, ListParams, ObjectList, Patch, PatchParams, PostParams, WatchParams,
};
use kube::core::object::HasStatus;
use kube::core::{TypeMeta, WatchEvent};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

#[async_trait]
pub trait ResourceInterface<K>: Send + Sync
where
    K: Resource + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K>;

    async fn list(&self, params: &ListParams) -> Result<ObjectList<K>>;

    async fn watch(
        &self,
        params: &WatchParams,
        version: &str,
    ) -> Result<BoxStream<'static, Result<WatchEvent<K>>>>;

    async fn create(&self, params: &PostParams, obj: &K) -> Result<K>;

    async fn update(&self, params: &PostParams, obj: &K) -> Result<K>;

    async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()>;

    async fn delete_collection(
        &self,
        params: &DeleteParams,
        list_params: &ListParams,
    ) -> Result<()>;

    /// Patch `name`; a non-empty `subresources` targets the first subresource listed.
    async fn patch(
        &self,
        name: &str,
        params: &PatchParams,
        patch_type: PatchType,
        data: &[u8],
        subresources: &[&str],
    ) -> Result<K>;
}

/// Status subresource access, for resources that have a status.
#[async_trait]
pub trait StatusInterface<K>: ResourceInterface<K>
where
    K: Resource + HasStatus + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn update_status(&self, params: &PostParams, obj: &K) -> Result<K>;
}

/// Resource client for a single namespace of a [`Fake`] fixture.
pub struct FakeResourceClient<K> {
    fake: Arc<Fake>,
    namespace: String,
    resource: ResourceMetadata,
    _marker: PhantomData<fn() -> K>,
}

impl<K> FakeResourceClient<K>
where
    K: Resource<DynamicType = ()>,
    K::Scope: 'static,
{
    pub fn new(fake: Arc<Fake>, namespace: impl Into<String>) -> Self {
        Self {
            fake,
            namespace: namespace.into(),
            resource: metadata_of::<K>(),
            _marker: PhantomData,
        }
    }
}

impl<K> FakeResourceClient<K> {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn fake(&self) -> &Arc<Fake> {
        &self.fake
    }

    /// Serialize an object for the fixture, filling in `apiVersion` and `kind`.
    fn encode(&self, obj: &K) -> Result<Value>
    where
        K: Serialize,
    {
        let mut value = serde_json::to_value(obj)?;
        let Some(fields) = value.as_object_mut() else {
            return Err(Error::Internal(format!(
                "{} did not serialize to an object",
                self.resource.kind
            )));
        };
        if fields.get("apiVersion").is_none_or(Value::is_null) {
            fields.insert(
                "apiVersion".to_string(),
                Value::String(self.resource.api_version()),
            );
        }
        if fields.get("kind").is_none_or(Value::is_null) {
            fields.insert("kind".to_string(), Value::String(self.resource.kind.clone()));
        }
        Ok(value)
    }

    fn decode(&self, value: Value) -> Result<K>
    where
        K: DeserializeOwned,
    {
        if value.is_null() {
            return Err(Error::Internal(format!(
                "fixture returned no {} object",
                self.resource.kind
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    fn decode_list(&self, value: Value) -> Result<ObjectList<K>>
    where
        K: Clone + DeserializeOwned,
    {
        let Value::Object(mut list) = value else {
            return Err(Error::Internal(format!(
                "fixture returned no {} list",
                self.resource.kind
            )));
        };

        let metadata: ListMeta = match list.remove("metadata") {
            Some(meta) if !meta.is_null() => serde_json::from_value(meta)?,
            _ => ListMeta::default(),
        };
        let items: Vec<K> = match list.remove("items") {
            Some(items) if !items.is_null() => serde_json::from_value(items)?,
            _ => Vec::new(),
        };

        Ok(ObjectList {
            types: TypeMeta {
                api_version: self.resource.api_version(),
                kind: format!("{}List", self.resource.kind),
            },
            metadata,
            items,
        })
    }
}

#[async_trait]
impl<K> ResourceInterface<K> for FakeResourceClient<K>
where
    K: Resource + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K> {
        let action = Action::get(self.resource.gvr(), &self.namespace, name);
        let value = self.fake.invokes(action)?;
        self.decode(value)
    }

    async fn list(&self, params: &ListParams) -> Result<ObjectList<K>> {
        let action = Action::list(
            self.resource.gvr(),
            self.resource.gvk(),
            &self.namespace,
            params.clone(),
        );
        let mut list = self.decode_list(self.fake.invokes(action)?)?;

        let selector = parse_label_selector(params.label_selector.as_deref().unwrap_or_default())?;
        list.items
            .retain(|item| matches_labels(item.meta().labels.as_ref(), &selector));
        trace!(
            "Listed {} {} in namespace {}",
            list.items.len(),
            self.resource.plural,
            self.namespace
        );
        Ok(list)
    }

    async fn watch(
        &self,
        params: &WatchParams,
        version: &str,
    ) -> Result<BoxStream<'static, Result<WatchEvent<K>>>> {
        let action = Action::watch(self.resource.gvr(), &self.namespace, params.clone(), version);
        let events = self.fake.invokes_watch(action)?;
        Ok(Watch::<K>::new(events).boxed())
    }

    async fn create(&self, _params: &PostParams, obj: &K) -> Result<K> {
        let action = Action::create(self.resource.gvr(), &self.namespace, self.encode(obj)?);
        let value = self.fake.invokes(action)?;
        self.decode(value)
    }

    async fn update(&self, _params: &PostParams, obj: &K) -> Result<K> {
        let action = Action::update(self.resource.gvr(), &self.namespace, self.encode(obj)?);
        let value = self.fake.invokes(action)?;
        self.decode(value)
    }

    async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()> {
        let action = Action::delete(self.resource.gvr(), &self.namespace, name, params.clone());
        self.fake.invokes(action)?;
        Ok(())
    }

    async fn delete_collection(
        &self,
        _params: &DeleteParams,
        list_params: &ListParams,
    ) -> Result<()> {
        let action =
            Action::delete_collection(self.resource.gvr(), &self.namespace, list_params.clone());
        self.fake.invokes(action)?;
        Ok(())
    }

    async fn patch(
        &self,
        name: &str,
        _params: &PatchParams,
        patch_type: PatchType,
        data: &[u8],
        subresources: &[&str],
    ) -> Result<K> {
        let action = Action::patch(
            self.resource.gvr(),
            &self.namespace,
            name,
            patch_type,
            data,
            subresources,
        );
        let value = self.fake.invokes(action)?;
        self.decode(value)
    }
}

#[async_trait]
impl<K> StatusInterface<K> for FakeResourceClient<K>
where
    K: Resource + HasStatus + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn update_status(&self, _params: &PostParams, obj: &K) -> Result<K> {
        let action = Action::update_subresource(
            self.resource.gvr(),
            "status",
            &self.namespace,
            self.encode(obj)?,
        );
        let value = self.fake.invokes(action)?;
        self.decode(value)
    }
}

fn object_name<K: Resource>(obj: &K) -> Result<String> {
    obj.meta()
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))
}

fn to_kube_patch(patch_type: PatchType, data: &[u8]) -> Result<Patch<Value>> {
    Ok(match patch_type {
        PatchType::Json => Patch::Json(serde_json::from_slice(data)?),
        PatchType::Merge => Patch::Merge(serde_json::from_slice(data)?),
        PatchType::StrategicMerge => Patch::Strategic(serde_json::from_slice(data)?),
        PatchType::Apply => Patch::Apply(serde_yaml::from_slice(data)?),
    })
}

#[async_trait]
impl<K> ResourceInterface<K> for Api<K>
where
    K: Resource + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<K> {
        Ok(Api::get(self, name).await?)
    }

    async fn list(&self, params: &ListParams) -> Result<ObjectList<K>> {
        Ok(Api::list(self, params).await?)
    }

    async fn watch(
        &self,
        params: &WatchParams,
        version: &str,
    ) -> Result<BoxStream<'static, Result<WatchEvent<K>>>> {
        let events = Api::watch(self, params, version).await?;
        Ok(events.map(|event| event.map_err(Error::from)).boxed())
    }

    async fn create(&self, params: &PostParams, obj: &K) -> Result<K> {
        Ok(Api::create(self, params, obj).await?)
    }

    async fn update(&self, params: &PostParams, obj: &K) -> Result<K> {
        let name = object_name(obj)?;
        Ok(Api::replace(self, &name, params, obj).await?)
    }

    async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()> {
        Api::delete(self, name, params).await?;
        Ok(())
    }

    async fn delete_collection(
        &self,
        params: &DeleteParams,
        list_params: &ListParams,
    ) -> Result<()> {
        Api::delete_collection(self, params, list_params).await?;
        Ok(())
    }

    async fn patch(
        &self,
        name: &str,
        params: &PatchParams,
        patch_type: PatchType,
        data: &[u8],
        subresources: &[&str],
    ) -> Result<K> {
        let patch = to_kube_patch(patch_type, data)?;
        match subresources.first() {
            Some(subresource) => {
                Ok(Api::patch_subresource(self, subresource, name, params, &patch).await?)
            }
            None => Ok(Api::patch(self, name, params, &patch).await?),
        }
    }
}

#[async_trait]
impl<K> StatusInterface<K> for Api<K>
where
    K: Resource + HasStatus + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn update_status(&self, params: &PostParams, obj: &K) -> Result<K> {
        let name = object_name(obj)?;
        let data = serde_json::to_vec(obj)?;
        Ok(Api::replace_status(self, &name, params, data).await?)
    }
}
