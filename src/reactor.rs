//! Reactors decide how the fixture answers an [`Action`]
//!
//! A reaction returns `Ok(Some(value))` to handle the action, `Ok(None)` to pass
//! it to the next reactor in the chain, or `Err(e)` to fail the call with `e`.

use crate::action::Action;
use crate::field_selectors::matches_field_selector;
use crate::label_selector::{matches_labels, parse_label_selector};
use crate::tracker::ObjectTracker;
use crate::watch::EventReceiver;
use crate::{Error, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

pub type ReactionFunc = Arc<dyn Fn(&Action) -> Result<Option<Value>> + Send + Sync>;
pub type WatchReactionFunc = Arc<dyn Fn(&Action) -> Result<Option<EventReceiver>> + Send + Sync>;

/// Reacts to actions matching a verb and resource, either of which may be `*`.
#[derive(Clone)]
pub struct SimpleReactor {
    pub verb: String,
    pub resource: String,
    pub reaction: ReactionFunc,
}

impl SimpleReactor {
    pub fn new(verb: impl Into<String>, resource: impl Into<String>, reaction: ReactionFunc) -> Self {
        Self {
            verb: verb.into(),
            resource: resource.into(),
            reaction,
        }
    }

    pub fn handles(&self, action: &Action) -> bool {
        action.matches(&self.verb, &self.resource)
    }

    pub fn react(&self, action: &Action) -> Result<Option<Value>> {
        (self.reaction)(action)
    }
}

#[derive(Clone)]
pub struct SimpleWatchReactor {
    pub resource: String,
    pub reaction: WatchReactionFunc,
}

impl SimpleWatchReactor {
    pub fn new(resource: impl Into<String>, reaction: WatchReactionFunc) -> Self {
        Self {
            resource: resource.into(),
            reaction,
        }
    }

    pub fn handles(&self, action: &Action) -> bool {
        action.matches("watch", &self.resource)
    }

    pub fn react(&self, action: &Action) -> Result<Option<EventReceiver>> {
        (self.reaction)(action)
    }
}

/// Default reaction answering every verb from the tracker.
pub fn object_reaction(tracker: Arc<ObjectTracker>) -> ReactionFunc {
    Arc::new(move |action: &Action| {
        trace!("Object reaction for {}", action);
        react_with_tracker(&tracker, action).map(Some)
    })
}

/// Default watch reaction subscribing to the tracker.
pub fn watch_reaction(tracker: Arc<ObjectTracker>) -> WatchReactionFunc {
    Arc::new(move |action: &Action| match action {
        Action::Watch {
            resource,
            namespace,
            ..
        } => Ok(Some(tracker.watch(resource, namespace))),
        other => Err(Error::InvalidRequest(format!(
            "watch reaction cannot handle {}",
            other
        ))),
    })
}

fn react_with_tracker(tracker: &ObjectTracker, action: &Action) -> Result<Value> {
    match action {
        Action::Get {
            resource,
            namespace,
            name,
        } => tracker.get(resource, namespace, name),
        Action::List {
            resource,
            kind,
            namespace,
            params,
        } => {
            let field_selector = params.field_selector.as_deref().unwrap_or_default();
            let mut items = Vec::new();
            for obj in tracker.list(resource, scope(namespace))? {
                if matches_field_selector(&obj, field_selector)? {
                    items.push(obj);
                }
            }
            Ok(json!({
                "apiVersion": kind.api_version(),
                "kind": format!("{}List", kind.kind),
                "metadata": {},
                "items": items,
            }))
        }
        Action::Create {
            resource,
            namespace,
            object,
            ..
        } => tracker.create(resource, object.clone(), namespace),
        Action::Update {
            resource,
            namespace,
            subresource,
            object,
        } => tracker.update(
            resource,
            object.clone(),
            namespace,
            subresource.as_deref() == Some("status"),
        ),
        Action::Patch {
            resource,
            namespace,
            name,
            subresource,
            patch_type,
            patch,
        } => tracker.patch(
            resource,
            namespace,
            name,
            *patch_type,
            patch,
            subresource.as_deref() == Some("status"),
        ),
        Action::Delete {
            resource,
            namespace,
            name,
            ..
        } => tracker.delete(resource, namespace, name),
        Action::DeleteCollection {
            resource,
            namespace,
            params,
        } => {
            let labels = parse_label_selector(params.label_selector.as_deref().unwrap_or_default())?;
            let fields = params.field_selector.as_deref().unwrap_or_default();

            let mut deleted = Vec::new();
            for obj in tracker.list(resource, scope(namespace))? {
                let obj_labels = object_labels(&obj)?;
                if !matches_labels(obj_labels.as_ref(), &labels)
                    || !matches_field_selector(&obj, fields)?
                {
                    continue;
                }
                let (ns, name) = object_key(&obj);
                deleted.push(tracker.delete(resource, &ns, &name)?);
            }
            Ok(Value::Array(deleted))
        }
        Action::Watch { .. } => Err(Error::InvalidRequest(
            "watch actions are served by the watch reaction chain".to_string(),
        )),
    }
}

fn scope(namespace: &str) -> Option<&str> {
    (!namespace.is_empty()).then_some(namespace)
}

pub(crate) fn object_labels(obj: &Value) -> Result<Option<BTreeMap<String, String>>> {
    match obj.get("metadata").and_then(|m| m.get("labels")) {
        Some(labels) if !labels.is_null() => Ok(Some(serde_json::from_value(labels.clone())?)),
        _ => Ok(None),
    }
}

fn object_key(obj: &Value) -> (String, String) {
    let field = |name: &str| {
        obj.get("metadata")
            .and_then(|m| m.get(name))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    (field("namespace"), field("name"))
}
