//! The in-memory fixture behind every fake client
//!
//! `Fake` records each [`Action`] it is asked to perform and answers it by
//! walking its reaction chain. A freshly built fixture ends both chains with
//! reactors backed by its [`ObjectTracker`].

use crate::action::Action;
use crate::reactor::{
    object_reaction, watch_reaction, ReactionFunc, SimpleReactor, SimpleWatchReactor,
    WatchReactionFunc,
};
use crate::tracker::ObjectTracker;
use crate::watch::EventReceiver;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, trace};

pub struct Fake {
    actions: Mutex<Vec<Action>>,
    reaction_chain: RwLock<Vec<SimpleReactor>>,
    watch_reaction_chain: RwLock<Vec<SimpleWatchReactor>>,
    tracker: Arc<ObjectTracker>,
}

impl Fake {
    pub fn new() -> Self {
        Self::with_tracker(Arc::new(ObjectTracker::new()))
    }

    pub fn with_tracker(tracker: Arc<ObjectTracker>) -> Self {
        let object = SimpleReactor::new("*", "*", object_reaction(tracker.clone()));
        let watch = SimpleWatchReactor::new("*", watch_reaction(tracker.clone()));

        Self {
            actions: Mutex::new(Vec::new()),
            reaction_chain: RwLock::new(vec![object]),
            watch_reaction_chain: RwLock::new(vec![watch]),
            tracker,
        }
    }

    /// Record `action` and return the result of the first reactor that handles it.
    pub fn invokes(&self, action: Action) -> Result<Value> {
        self.record(&action);

        // Reactors may call back into the fixture, so the chain is not held locked.
        let chain = self
            .reaction_chain
            .read()
            .expect("Fake reaction chain lock poisoned")
            .clone();

        for reactor in chain.iter().filter(|r| r.handles(&action)) {
            match reactor.react(&action) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => continue,
                Err(e) => {
                    debug!(
                        "Reactor {} {} failed {}: {}",
                        reactor.verb, reactor.resource, action, e
                    );
                    return Err(e);
                }
            }
        }

        Err(Error::Internal(format!("no reaction implemented for {}", action)))
    }

    /// Record a watch action and return the event source of the first watch reactor that handles it.
    pub fn invokes_watch(&self, action: Action) -> Result<EventReceiver> {
        self.record(&action);

        let chain = self
            .watch_reaction_chain
            .read()
            .expect("Fake reaction chain lock poisoned")
            .clone();

        for reactor in chain.iter().filter(|r| r.handles(&action)) {
            if let Some(events) = reactor.react(&action)? {
                return Ok(events);
            }
        }

        Err(Error::Internal(format!(
            "no watch reaction implemented for {}",
            action
        )))
    }

    /// Append a reactor; it only sees actions the existing reactors pass on.
    pub fn add_reactor(&self, verb: &str, resource: &str, reaction: ReactionFunc) {
        debug!("Adding reactor for {} {}", verb, resource);
        self.reaction_chain
            .write()
            .expect("Fake reaction chain lock poisoned")
            .push(SimpleReactor::new(verb, resource, reaction));
    }

    /// Insert a reactor at the front of the chain.
    pub fn prepend_reactor(&self, verb: &str, resource: &str, reaction: ReactionFunc) {
        debug!("Prepending reactor for {} {}", verb, resource);
        self.reaction_chain
            .write()
            .expect("Fake reaction chain lock poisoned")
            .insert(0, SimpleReactor::new(verb, resource, reaction));
    }

    pub fn add_watch_reactor(&self, resource: &str, reaction: WatchReactionFunc) {
        self.watch_reaction_chain
            .write()
            .expect("Fake reaction chain lock poisoned")
            .push(SimpleWatchReactor::new(resource, reaction));
    }

    pub fn prepend_watch_reactor(&self, resource: &str, reaction: WatchReactionFunc) {
        self.watch_reaction_chain
            .write()
            .expect("Fake reaction chain lock poisoned")
            .insert(0, SimpleWatchReactor::new(resource, reaction));
    }

    /// Every action recorded so far, oldest first.
    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .lock()
            .expect("Fake action log lock poisoned")
            .clone()
    }

    pub fn clear_actions(&self) {
        self.actions
            .lock()
            .expect("Fake action log lock poisoned")
            .clear();
    }

    pub fn tracker(&self) -> &Arc<ObjectTracker> {
        &self.tracker
    }

    fn record(&self, action: &Action) {
        trace!("Recording action: {}", action);
        self.actions
            .lock()
            .expect("Fake action log lock poisoned")
            .push(action.clone());
    }
}

impl Default for Fake {
    fn default() -> Self {
        Self::new()
    }
}
