//! Change listeners
//!
//! Listeners observe one container. They are called during the propagation
//! pass with shared references only, so they cannot change the tree while a
//! pass is running.

use std::cell::RefCell;
use std::rc::Rc;

use conftree_model::Configuration;
use serde::{Deserialize, Serialize};

use super::{ConfigTree, NodeId, TreeError};

/// Handle returned by [`ConfigTree::register_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(pub u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Observer of a container's override changes
pub trait ConfigurationListener {
    /// The resolved override changed (called once per actual change)
    fn on_requested_override_changed(&mut self, _resolved: &Configuration) {}

    /// The merged override changed.
    ///
    /// Not called on every recompute of the container: only when the merged
    /// override differs from its previous value. A pass that leaves it
    /// untouched, such as a resolved change the parent already implied,
    /// makes no call.
    fn on_merged_override_changed(&mut self, _merged: &Configuration) {}
}

impl ConfigTree {
    /// Attach a listener to `node`.
    ///
    /// The listener immediately receives the current resolved and merged
    /// overrides so it starts in sync.
    pub fn register_listener(
        &mut self,
        node: NodeId,
        mut listener: Box<dyn ConfigurationListener>,
    ) -> Result<ListenerId, TreeError> {
        let id = ListenerId(self.next_listener);
        let slot = self.slot_mut(node)?;
        listener.on_requested_override_changed(&slot.resolved);
        listener.on_merged_override_changed(&slot.merged);
        slot.listeners.push((id, listener));
        self.next_listener += 1;
        Ok(id)
    }

    /// Detach a listener and hand it back
    pub fn unregister_listener(
        &mut self,
        node: NodeId,
        listener: ListenerId,
    ) -> Result<Box<dyn ConfigurationListener>, TreeError> {
        let slot = self.slot_mut(node)?;
        let index = slot
            .listeners
            .iter()
            .position(|(id, _)| *id == listener)
            .ok_or(TreeError::UnknownListener { node, listener })?;
        Ok(slot.listeners.remove(index).1)
    }
}

/// Which callback produced a [`ListenerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerEventKind {
    ResolvedOverride,
    MergedOverride,
}

/// One recorded listener callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerEvent {
    /// Name of the observed container
    pub node: String,
    pub kind: ListenerEventKind,
    pub configuration: Configuration,
}

/// Shared, append-only record of listener callbacks.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ListenerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends to this log, tagging events with `node`
    pub fn listener_for(&self, node: impl Into<String>) -> Box<dyn ConfigurationListener> {
        Box::new(RecordingListener {
            node: node.into(),
            log: self.clone(),
        })
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Number of events of `kind` recorded for `node`
    pub fn count(&self, node: &str, kind: ListenerEventKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.node == node && event.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, event: ListenerEvent) {
        self.events.borrow_mut().push(event);
    }
}

struct RecordingListener {
    node: String,
    log: EventLog,
}

impl ConfigurationListener for RecordingListener {
    fn on_requested_override_changed(&mut self, resolved: &Configuration) {
        self.log.push(ListenerEvent {
            node: self.node.clone(),
            kind: ListenerEventKind::ResolvedOverride,
            configuration: resolved.clone(),
        });
    }

    fn on_merged_override_changed(&mut self, merged: &Configuration) {
        self.log.push(ListenerEvent {
            node: self.node.clone(),
            kind: ListenerEventKind::MergedOverride,
            configuration: merged.clone(),
        });
    }
}
