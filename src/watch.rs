//! Watch event streams handed out by the fake fixture

use crate::{Error, Result};
use futures::Stream;
use kube::core::WatchEvent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<WatchEvent<Value>>;
pub type EventReceiver = mpsc::UnboundedReceiver<WatchEvent<Value>>;

/// Typed stream of watch events.
///
/// The stream ends once every sender for it has been dropped, or after
/// [`Watch::stop`].
pub struct Watch<K> {
    events: EventReceiver,
    _marker: PhantomData<fn() -> K>,
}

impl<K> Watch<K> {
    pub fn new(events: EventReceiver) -> Self {
        Self {
            events,
            _marker: PhantomData,
        }
    }

    /// Stop receiving new events. Already queued events are still delivered.
    pub fn stop(&mut self) {
        self.events.close();
    }
}

impl<K> Stream for Watch<K>
where
    K: DeserializeOwned,
{
    type Item = Result<WatchEvent<K>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .events
            .poll_recv(cx)
            .map(|event| event.map(decode_event))
    }
}

fn decode_event<K: DeserializeOwned>(event: WatchEvent<Value>) -> Result<WatchEvent<K>> {
    Ok(match event {
        WatchEvent::Added(obj) => WatchEvent::Added(serde_json::from_value(obj)?),
        WatchEvent::Modified(obj) => WatchEvent::Modified(serde_json::from_value(obj)?),
        WatchEvent::Deleted(obj) => WatchEvent::Deleted(serde_json::from_value(obj)?),
        WatchEvent::Bookmark(bookmark) => WatchEvent::Bookmark(bookmark),
        WatchEvent::Error(err) => WatchEvent::Error(err),
    })
}

/// Manually driven event source, for watch reactors that script their events.
#[derive(Clone)]
pub struct FakeWatcher {
    sender: EventSender,
}

impl FakeWatcher {
    /// A watcher and the receiving end to hand back from a watch reactor.
    pub fn new() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn add<K: Serialize>(&self, obj: &K) -> Result<()> {
        self.send(WatchEvent::Added(serde_json::to_value(obj)?))
    }

    pub fn modify<K: Serialize>(&self, obj: &K) -> Result<()> {
        self.send(WatchEvent::Modified(serde_json::to_value(obj)?))
    }

    pub fn delete<K: Serialize>(&self, obj: &K) -> Result<()> {
        self.send(WatchEvent::Deleted(serde_json::to_value(obj)?))
    }

    pub fn error(&self, err: kube::core::ErrorResponse) -> Result<()> {
        self.send(WatchEvent::Error(err))
    }

    pub fn is_stopped(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, event: WatchEvent<Value>) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| Error::Internal("watch receiver has been dropped".to_string()))
    }
}
