//! Propagation pass
//!
//! Recomputes resolved, full and merged configurations for a container and
//! every descendant. The pass walks an explicit worklist in depth-first
//! pre-order, so a parent is always finished before any of its children
//! read its full or merged configuration. Children are visited last-to-first.

use conftree_model::Configuration;
use tracing::{debug, trace};

use super::{ConfigTree, NodeId};

/// What changed at one container during a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeUpdate {
    pub(crate) resolved_changed: bool,
    pub(crate) merged_changed: bool,
}

impl ConfigTree {
    /// Run the propagation pass rooted at `start`. Returns the number of
    /// containers visited.
    pub(crate) fn propagate(&mut self, start: NodeId) -> usize {
        let mut worklist = vec![start];
        let mut visited = 0usize;
        let mut notified = 0usize;

        while let Some(id) = worklist.pop() {
            let Some(update) = self.recompute(id) else {
                continue;
            };
            visited += 1;
            if update.resolved_changed {
                notified += 1;
            }
            if let Some(node) = self.slot(id) {
                // Popping from the end visits the last child first
                worklist.extend(node.children.iter().copied());
            }
        }

        debug!(start = %start, visited, notified, "propagation pass complete");
        visited
    }

    /// Recompute one container against its parent's current values and
    /// notify its listeners. Returns `None` for a stale id.
    fn recompute(&mut self, id: NodeId) -> Option<NodeUpdate> {
        let parent = self.slot(id)?.parent;
        let (parent_full, parent_merged) = match parent.and_then(|p| self.slot(p)) {
            Some(parent) => (parent.full.clone(), Some(parent.merged.clone())),
            None => (Configuration::empty(), None),
        };

        let node = self.slot_mut_opt(id)?;

        let resolved = node.policy.resolve(&node.requested, &parent_full);
        let full = Configuration::merged(&parent_full, &resolved);
        let merged = match parent_merged {
            Some(parent_merged) => Configuration::merged(&parent_merged, &resolved),
            None => resolved.clone(),
        };

        let update = NodeUpdate {
            resolved_changed: resolved != node.resolved,
            merged_changed: merged != node.merged,
        };

        trace!(
            node = %id,
            name = %node.name,
            full_changed = ?node.full.diff(&full),
            resolved_changed = update.resolved_changed,
            merged_changed = update.merged_changed,
            "container recomputed"
        );

        node.resolved = resolved;
        node.full = full;
        node.merged = merged;

        // Most recently registered listener first
        if update.resolved_changed {
            for (_, listener) in node.listeners.iter_mut().rev() {
                listener.on_requested_override_changed(&node.resolved);
            }
        }
        if update.merged_changed {
            for (_, listener) in node.listeners.iter_mut().rev() {
                listener.on_merged_override_changed(&node.merged);
            }
        }

        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftree_model::{ActivityType, Rect, WindowingMode};

    fn with_dpi(dpi: u32) -> Configuration {
        Configuration {
            density_dpi: Some(dpi),
            ..Default::default()
        }
    }

    /// full(n) == merge(full(parent), resolved(n)) and the merged equivalent
    fn assert_consistent(tree: &ConfigTree) {
        for root in tree.roots() {
            for id in tree.descendants(root).unwrap() {
                let node = tree.node(id).unwrap();
                match node.parent_ref() {
                    Some(parent) => {
                        assert_eq!(
                            node.configuration(),
                            &Configuration::merged(parent.configuration(), node.resolved_override())
                        );
                        assert_eq!(
                            node.merged_override(),
                            &Configuration::merged(parent.merged_override(), node.resolved_override())
                        );
                    }
                    None => {
                        assert_eq!(
                            node.configuration(),
                            &Configuration::merged(&Configuration::empty(), node.resolved_override())
                        );
                        assert_eq!(node.merged_override(), node.resolved_override());
                    }
                }
            }
        }
    }

    #[test]
    fn test_pass_visits_whole_subtree() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("root");
        let a = tree.add_child(root, "a").unwrap();
        tree.add_child(a, "a1").unwrap();
        tree.add_child(root, "b").unwrap();

        assert_eq!(tree.propagate(root), 4);
        assert_eq!(tree.propagate(a), 2);
    }

    #[test]
    fn test_child_override_layers_on_parent() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();

        let mut display = with_dpi(420);
        display.window.bounds = Rect::new(0, 0, 1000, 2000);
        display.window.windowing_mode = WindowingMode::Fullscreen;
        tree.set_requested_override(root, display).unwrap();

        let mut request = Configuration::default();
        request.window.windowing_mode = WindowingMode::Freeform;
        request.window.activity_type = ActivityType::Standard;
        tree.set_requested_override(task, request).unwrap();

        let node = tree.node(task).unwrap();
        assert_eq!(node.windowing_mode(), WindowingMode::Freeform);
        assert_eq!(node.bounds(), Rect::new(0, 0, 1000, 2000));
        assert_eq!(node.configuration().density_dpi, Some(420));
        assert_eq!(node.merged_override().density_dpi, Some(420));
        assert_eq!(
            node.merged_override().window.windowing_mode,
            WindowingMode::Freeform
        );
        assert_consistent(&tree);
    }

    #[test]
    fn test_unchanged_child_still_sees_new_parent_values() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        let activity = tree.add_child(task, "activity").unwrap();
        tree.set_requested_override(task, with_dpi(320)).unwrap();

        let mut display = Configuration::default();
        display.locale = Some("de-DE".to_string());
        tree.set_requested_override(root, display).unwrap();

        let leaf = tree.node(activity).unwrap();
        assert_eq!(leaf.configuration().locale.as_deref(), Some("de-DE"));
        assert_eq!(leaf.configuration().density_dpi, Some(320));
        assert_consistent(&tree);
    }

    #[test]
    fn test_merged_at_root_equals_resolved() {
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        tree.set_requested_override(root, with_dpi(240)).unwrap();

        let node = tree.node(root).unwrap();
        assert_eq!(node.merged_override(), node.resolved_override());
        assert_consistent(&tree);
    }

    #[test]
    fn test_merged_skips_global_values() {
        // merged only carries overrides, full carries everything inherited
        let mut tree = ConfigTree::new();
        let root = tree.create_node("display");
        let task = tree.add_child(root, "task").unwrap();
        tree.set_requested_override(root, with_dpi(480)).unwrap();

        let mut request = Configuration::default();
        request.window.windowing_mode = WindowingMode::Pinned;
        tree.set_requested_override(task, request).unwrap();
        tree.set_requested_override(root, Configuration::empty()).unwrap();

        let node = tree.node(task).unwrap();
        assert_eq!(node.configuration().density_dpi, None);
        assert_eq!(node.merged_override().density_dpi, None);
        assert_eq!(node.windowing_mode(), WindowingMode::Pinned);
        assert_consistent(&tree);
    }

    #[test]
    fn test_reparent_recomputes_descendants() {
        let mut tree = ConfigTree::new();
        let left = tree.create_node("left");
        let right = tree.create_node("right");
        let task = tree.add_child(left, "task").unwrap();
        let activity = tree.add_child(task, "activity").unwrap();

        tree.set_requested_override(left, with_dpi(160)).unwrap();
        tree.set_requested_override(right, with_dpi(640)).unwrap();
        assert_eq!(tree.node(activity).unwrap().configuration().density_dpi, Some(160));

        tree.set_parent(task, Some(right)).unwrap();

        assert_eq!(tree.node(activity).unwrap().configuration().density_dpi, Some(640));
        assert_eq!(tree.node(activity).unwrap().merged_override().density_dpi, Some(640));
        assert_consistent(&tree);
    }
}
