//! Container storage and read-only views

use conftree_model::{Configuration, WindowConfiguration};
use serde::{Deserialize, Serialize};

use super::listener::{ConfigurationListener, ListenerId};
use super::policy::OverridePolicy;
use super::ConfigTree;

/// Index of a container in a [`ConfigTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A container slot in the arena
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    /// Override requested by the owner
    pub(crate) requested: Configuration,
    /// Request after policy constraints against the parent
    pub(crate) resolved: Configuration,
    /// Parent's full configuration updated by `resolved`
    pub(crate) full: Configuration,
    /// Override chain from the root down to this container
    pub(crate) merged: Configuration,

    /// `requested` is not empty
    pub(crate) has_override: bool,
    pub(crate) focusable: bool,
    pub(crate) policy: Box<dyn OverridePolicy>,
    pub(crate) listeners: Vec<(ListenerId, Box<dyn ConfigurationListener>)>,
}

impl Node {
    pub(crate) fn new(name: String, policy: Box<dyn OverridePolicy>) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            requested: Configuration::default(),
            resolved: Configuration::default(),
            full: Configuration::default(),
            merged: Configuration::default(),
            has_override: false,
            focusable: true,
            policy,
            listeners: Vec::new(),
        }
    }
}

/// Borrowed view of one container
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ConfigTree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a ConfigTree, id: NodeId, node: &'a Node) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// View of the parent container, if attached
    pub fn parent_ref(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|parent| self.tree.get(parent))
    }

    pub fn children(&self) -> &'a [NodeId] {
        &self.node.children
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn has_child(&self) -> bool {
        !self.node.children.is_empty()
    }

    /// Full configuration: the parent's full configuration updated by the
    /// resolved override
    pub fn configuration(&self) -> &'a Configuration {
        &self.node.full
    }

    pub fn window_configuration(&self) -> &'a WindowConfiguration {
        &self.node.full.window
    }

    pub fn requested_override(&self) -> &'a Configuration {
        &self.node.requested
    }

    pub fn resolved_override(&self) -> &'a Configuration {
        &self.node.resolved
    }

    /// Overrides merged from the root down to this container; this is what
    /// a client would receive as its override configuration
    pub fn merged_override(&self) -> &'a Configuration {
        &self.node.merged
    }

    pub fn has_override_configuration(&self) -> bool {
        self.node.has_override
    }

    pub fn policy_name(&self) -> &'a str {
        self.node.policy.name()
    }

    pub fn listener_count(&self) -> usize {
        self.node.listeners.len()
    }

    pub fn contains_listener(&self, listener: ListenerId) -> bool {
        self.node.listeners.iter().any(|(id, _)| *id == listener)
    }

    /// A container is focusable only when it and every ancestor are
    pub fn is_focusable(&self) -> bool {
        let mut current = Some(*self);
        while let Some(node) = current {
            if !node.node.focusable {
                return false;
            }
            current = node.parent_ref();
        }
        true
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.node.name)
            .field("parent", &self.node.parent)
            .field("children", &self.node.children)
            .finish()
    }
}
