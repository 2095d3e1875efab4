//! Configuration container tree
//!
//! Containers live in an arena ([`ConfigTree`]) and refer to each other by
//! [`NodeId`]. Each container holds a requested override; the tree derives
//! the resolved override, the full configuration and the merged override
//! for every container and keeps them consistent:
//!
//! - `full = parent.full` updated by `resolved`
//! - `merged = parent.merged` updated by `resolved` (`resolved` at a root)
//!
//! Any change to a container's request or position in the tree re-runs the
//! propagation pass over that container's subtree.

mod bounds;
mod listener;
mod node;
mod policy;
mod propagate;
mod query;

pub use bounds::{equivalent_bounds, BoundsChange};
pub use listener::{ConfigurationListener, EventLog, ListenerEvent, ListenerEventKind, ListenerId};
pub use node::{NodeId, NodeRef};
pub use policy::{
    policy_by_name, BoundsWithinParent, FullscreenOnly, OverridePolicy, PassThrough, POLICY_NAMES,
};
pub use query::has_compatible_activity_type;

use std::collections::BTreeSet;

use conftree_model::{ActivityType, Configuration};
use tracing::{debug, info};

use node::Node;

/// Errors for tree operations
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Unknown listener {listener} on node {node}")]
    UnknownListener { node: NodeId, listener: ListenerId },

    #[error("Cannot attach {node} under {parent}: {parent} is {node} or one of its descendants")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("Can't change activity type once set: {node} activity_type={current} requested={requested}")]
    ActivityTypeAlreadySet {
        node: NodeId,
        current: ActivityType,
        requested: ActivityType,
    },
}

/// Arena of configuration containers
#[derive(Default)]
pub struct ConfigTree {
    /// Slots indexed by `NodeId`. Removed containers leave `None` and their
    /// slot is never reused, so a stale id can't alias a newer container.
    nodes: Vec<Option<Node>>,

    /// Number of `Some` slots
    live: usize,

    /// Live containers without a parent
    roots: BTreeSet<NodeId>,

    /// Next listener id to hand out
    next_listener: u64,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live containers
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Read-only view of a container
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slot(id).map(|node| NodeRef::new(self, id, node))
    }

    /// Read-only view of a container, failing for unknown ids
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_>, TreeError> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Containers without a parent, in creation order
    pub fn roots(&self) -> Vec<NodeId> {
        self.roots.iter().copied().collect()
    }

    /// `id` and all of its descendants in depth-first pre-order
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        self.node(id)?;
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            if let Some(node) = self.slot(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        Ok(order)
    }

    /// Create a detached container using the pass-through policy
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node_with_policy(name, Box::new(PassThrough))
    }

    /// Create a detached container with a custom override policy
    pub fn create_node_with_policy(
        &mut self,
        name: impl Into<String>,
        policy: Box<dyn OverridePolicy>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(name.into(), policy)));
        self.live += 1;
        self.roots.insert(id);
        self.propagate(id);
        id
    }

    /// Create a container as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, TreeError> {
        self.add_child_with_policy(parent, name, Box::new(PassThrough))
    }

    pub fn add_child_with_policy(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        policy: Box<dyn OverridePolicy>,
    ) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let id = self.create_node_with_policy(name, policy);
        self.set_parent(id, Some(parent))?;
        Ok(id)
    }

    /// Replace the requested override of `id` and propagate the result
    /// through its subtree.
    pub fn set_requested_override(
        &mut self,
        id: NodeId,
        requested: Configuration,
    ) -> Result<(), TreeError> {
        let node = self.slot_mut(id)?;
        node.has_override = !requested.is_empty();
        node.requested = requested;
        self.propagate(id);
        Ok(())
    }

    /// Edit the requested override in place, then propagate
    pub fn update_requested_override(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Configuration),
    ) -> Result<(), TreeError> {
        let mut requested = self.slot_mut(id)?.requested.clone();
        edit(&mut requested);
        self.set_requested_override(id, requested)
    }

    /// Move `id` under `new_parent` (or detach it with `None`).
    ///
    /// The container becomes the last child of its new parent and its whole
    /// subtree is recomputed. Detaching leaves the derived configurations as
    /// they are; they are refreshed when the container is attached again.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        let old_parent = self.node(id)?.parent();
        if let Some(parent) = new_parent {
            self.node(parent)?;
            if parent == id || self.is_ancestor(id, parent) {
                return Err(TreeError::CycleDetected { node: id, parent });
            }
        }
        if old_parent == new_parent {
            return Ok(());
        }

        if let Some(old) = old_parent {
            if let Some(node) = self.slot_mut_opt(old) {
                node.children.retain(|child| *child != id);
            }
        }
        if let Some(parent) = new_parent {
            if let Some(node) = self.slot_mut_opt(parent) {
                node.children.push(id);
            }
        }
        self.slot_mut(id)?.parent = new_parent;
        if new_parent.is_some() {
            self.roots.remove(&id);
        } else {
            self.roots.insert(id);
        }

        match old_parent {
            Some(old) => info!(
                node = %id,
                old_parent = %old,
                new_parent = ?new_parent.map(|p| p.to_string()),
                "container reparented"
            ),
            None => debug!(node = %id, new_parent = ?new_parent.map(|p| p.to_string()), "container attached"),
        }

        if new_parent.is_some() {
            self.propagate(id);
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns the number of containers removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize, TreeError> {
        let doomed = self.descendants(id)?;
        self.set_parent(id, None)?;
        for node in &doomed {
            if self.nodes[node.0].take().is_some() {
                self.live -= 1;
            }
            self.roots.remove(node);
        }
        info!(node = %id, removed = doomed.len(), "container removed");
        Ok(doomed.len())
    }

    /// True when `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.slot(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.slot(parent).and_then(|node| node.parent);
        }
        false
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut_opt(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slot_mut_opt(id).ok_or(TreeError::UnknownNode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftree_model::{Rect, WindowingMode};

    fn display_override() -> Configuration {
        let mut config = Configuration {
            density_dpi: Some(420),
            ..Default::default()
        };
        config.window.bounds = Rect::new(0, 0, 1080, 2340);
        config.window.windowing_mode = WindowingMode::Fullscreen;
        config
    }

    #[test]
    fn test_create_and_attach() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.roots(), vec![root]);
        assert_eq!(tree.node(task).unwrap().parent(), Some(root));
        assert_eq!(tree.node(root).unwrap().children(), &[task]);
    }

    #[test]
    fn test_override_reaches_children() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        let activity = tree.add_child(task, "activity").unwrap();

        tree.set_requested_override(root, display_override()).unwrap();

        let leaf = tree.node(activity).unwrap();
        assert_eq!(leaf.configuration().density_dpi, Some(420));
        assert_eq!(leaf.windowing_mode(), WindowingMode::Fullscreen);
        // Nothing requested below the root
        assert!(leaf.merged_override().density_dpi.is_some());
        assert!(leaf.resolved_override().is_empty());
    }

    #[test]
    fn test_has_override_flag() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        assert!(!tree.node(root).unwrap().has_override_configuration());

        tree.set_requested_override(root, display_override()).unwrap();
        assert!(tree.node(root).unwrap().has_override_configuration());

        tree.set_requested_override(root, Configuration::empty()).unwrap();
        assert!(!tree.node(root).unwrap().has_override_configuration());
    }

    #[test]
    fn test_unknown_node() {
        let mut tree = ConfigTree::new();
        let result = tree.set_requested_override(NodeId(7), Configuration::empty());
        assert!(matches!(result, Err(TreeError::UnknownNode(NodeId(7)))));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        let activity = tree.add_child(task, "activity").unwrap();

        let err = tree.set_parent(root, Some(activity)).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
        let err = tree.set_parent(task, Some(task)).unwrap_err();
        assert!(matches!(err, TreeError::CycleDetected { .. }));
        // Tree unchanged
        assert_eq!(tree.node(root).unwrap().parent(), None);
    }

    #[test]
    fn test_reparent_moves_child_list_entry() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let a = tree.add_child(root, "a").unwrap();
        let b = tree.add_child(root, "b").unwrap();
        let leaf = tree.add_child(a, "leaf").unwrap();

        tree.set_parent(leaf, Some(b)).unwrap();

        assert!(tree.node(a).unwrap().children().is_empty());
        assert_eq!(tree.node(b).unwrap().children(), &[leaf]);
        assert_eq!(tree.node(leaf).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_detach_keeps_derived_values() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        tree.set_requested_override(root, display_override()).unwrap();

        tree.set_parent(task, None).unwrap();

        let task_ref = tree.node(task).unwrap();
        assert_eq!(task_ref.parent(), None);
        assert_eq!(task_ref.configuration().density_dpi, Some(420));
        assert_eq!(tree.roots(), vec![root, task]);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        let activity = tree.add_child(task, "activity").unwrap();
        let other = tree.add_child(root, "other").unwrap();

        assert_eq!(tree.remove(task).unwrap(), 2);

        assert!(!tree.contains(task));
        assert!(!tree.contains(activity));
        assert!(tree.contains(other));
        assert_eq!(tree.node(root).unwrap().children(), &[other]);
        assert!(tree.set_requested_override(activity, Configuration::empty()).is_err());
    }

    #[test]
    fn test_len_and_roots_track_structure() {
        let mut tree = ConfigTree::new();
        let a = tree.create_node("a");
        let b = tree.create_node("b");
        let child = tree.add_child(a, "child").unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots(), vec![a, b]);

        tree.set_parent(child, None).unwrap();
        assert_eq!(tree.roots(), vec![a, b, child]);
        tree.set_parent(a, Some(b)).unwrap();
        assert_eq!(tree.roots(), vec![b, child]);

        assert_eq!(tree.remove(b).unwrap(), 2);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.roots(), vec![child]);

        // Removed slots are not handed out again
        let fresh = tree.create_node("fresh");
        assert!(fresh.0 > b.0 && fresh.0 > a.0);
        assert!(!tree.contains(a));
        assert_eq!(tree.len(), 2);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("root");
        let a = tree.add_child(root, "a").unwrap();
        let a1 = tree.add_child(a, "a1").unwrap();
        let b = tree.add_child(root, "b").unwrap();

        assert_eq!(tree.descendants(root).unwrap(), vec![root, a, a1, b]);
    }

    #[test]
    fn test_update_requested_override() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        tree.set_requested_override(root, display_override()).unwrap();

        tree.update_requested_override(root, |config| config.density_dpi = Some(160))
            .unwrap();

        let node = tree.node(root).unwrap();
        assert_eq!(node.configuration().density_dpi, Some(160));
        assert_eq!(node.windowing_mode(), WindowingMode::Fullscreen);
    }
}
