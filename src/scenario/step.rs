//! Scenario steps

use conftree_model::{ActivityType, Configuration, Rect, WindowingMode};
use serde::{Deserialize, Serialize};

use crate::tree::{BoundsChange, ConfigTree, NodeId, TreeError};

/// One mutation applied to the tree, tagged by `op` in TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replace the requested override
    SetOverride {
        node: String,
        #[serde(default, rename = "override")]
        configuration: Configuration,
    },
    /// Request bounds; omit `bounds` to match the parent
    SetBounds {
        node: String,
        #[serde(default)]
        bounds: Option<Rect>,
    },
    SetWindowingMode {
        node: String,
        mode: WindowingMode,
    },
    SetDisplayWindowingMode {
        node: String,
        mode: WindowingMode,
    },
    SetAlwaysOnTop {
        node: String,
        on: bool,
    },
    SetActivityType {
        node: String,
        activity_type: ActivityType,
    },
    SetFocusable {
        node: String,
        focusable: bool,
    },
    /// Move under `parent`; omit `parent` to detach
    Reparent {
        node: String,
        #[serde(default)]
        parent: Option<String>,
    },
    /// Remove the container and its subtree
    Remove {
        node: String,
    },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::SetOverride { .. } => "set_override",
            Step::SetBounds { .. } => "set_bounds",
            Step::SetWindowingMode { .. } => "set_windowing_mode",
            Step::SetDisplayWindowingMode { .. } => "set_display_windowing_mode",
            Step::SetAlwaysOnTop { .. } => "set_always_on_top",
            Step::SetActivityType { .. } => "set_activity_type",
            Step::SetFocusable { .. } => "set_focusable",
            Step::Reparent { .. } => "reparent",
            Step::Remove { .. } => "remove",
        }
    }

    /// Name of the container the step targets
    pub fn node(&self) -> &str {
        match self {
            Step::SetOverride { node, .. }
            | Step::SetBounds { node, .. }
            | Step::SetWindowingMode { node, .. }
            | Step::SetDisplayWindowingMode { node, .. }
            | Step::SetAlwaysOnTop { node, .. }
            | Step::SetActivityType { node, .. }
            | Step::SetFocusable { node, .. }
            | Step::Reparent { node, .. }
            | Step::Remove { node } => node,
        }
    }

    /// Other container names the step refers to
    pub(crate) fn referenced_parent(&self) -> Option<&str> {
        match self {
            Step::Reparent { parent, .. } => parent.as_deref(),
            _ => None,
        }
    }

    /// Apply to `tree`. `id` is the target, `parent` the resolved reparent target.
    pub(crate) fn apply(
        &self,
        tree: &mut ConfigTree,
        id: NodeId,
        parent: Option<NodeId>,
    ) -> Result<StepEffect, TreeError> {
        let mut effect = StepEffect::default();
        match self {
            Step::SetOverride { configuration, .. } => {
                tree.set_requested_override(id, configuration.clone())?;
            }
            Step::SetBounds { bounds, .. } => {
                effect.bounds_change = Some(tree.set_bounds(id, *bounds)?);
            }
            Step::SetWindowingMode { mode, .. } => tree.set_windowing_mode(id, *mode)?,
            Step::SetDisplayWindowingMode { mode, .. } => {
                tree.set_display_windowing_mode(id, *mode)?;
            }
            Step::SetAlwaysOnTop { on, .. } => tree.set_always_on_top(id, *on)?,
            Step::SetActivityType { activity_type, .. } => {
                tree.set_activity_type(id, *activity_type)?;
            }
            Step::SetFocusable { focusable, .. } => {
                effect.focus_changed = Some(tree.set_focusable(id, *focusable)?);
            }
            Step::Reparent { .. } => tree.set_parent(id, parent)?,
            Step::Remove { .. } => {
                effect.removed = Some(tree.remove(id)?);
            }
        }
        Ok(effect)
    }
}

/// Step-specific results worth reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct StepEffect {
    pub(crate) bounds_change: Option<BoundsChange>,
    pub(crate) focus_changed: Option<bool>,
    pub(crate) removed: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Steps {
        step: Vec<Step>,
    }

    #[test]
    fn test_parse_steps() {
        let text = r#"
            [[step]]
            op = "set_bounds"
            node = "task"
            bounds = { left = 0, top = 0, right = 500, bottom = 800 }

            [[step]]
            op = "set_bounds"
            node = "task"

            [[step]]
            op = "set_windowing_mode"
            node = "task"
            mode = "split_screen_primary"

            [[step]]
            op = "reparent"
            node = "task"
            parent = "display"

            [[step]]
            op = "set_override"
            node = "display"
            [step.override]
            density_dpi = 320
        "#;

        let steps: Steps = toml::from_str(text).unwrap();
        let steps = steps.step;

        assert_eq!(steps.len(), 5);
        assert!(matches!(
            &steps[0],
            Step::SetBounds { bounds: Some(r), .. } if *r == Rect::new(0, 0, 500, 800)
        ));
        assert!(matches!(&steps[1], Step::SetBounds { bounds: None, .. }));
        assert!(matches!(
            &steps[2],
            Step::SetWindowingMode { mode: WindowingMode::SplitScreenPrimary, .. }
        ));
        assert_eq!(steps[3].referenced_parent(), Some("display"));
        match &steps[4] {
            Step::SetOverride { configuration, .. } => {
                assert_eq!(configuration.density_dpi, Some(320));
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_op_and_node() {
        let step = Step::SetActivityType {
            node: "home".to_string(),
            activity_type: ActivityType::Home,
        };
        assert_eq!(step.op(), "set_activity_type");
        assert_eq!(step.node(), "home");
    }

    #[test]
    fn test_apply_bounds_reports_change() {
        let mut tree = ConfigTree::new();
        let id = tree.create_node("task");
        let step = Step::SetBounds {
            node: "task".to_string(),
            bounds: Some(Rect::new(10, 10, 20, 20)),
        };

        let effect = step.apply(&mut tree, id, None).unwrap();

        assert_eq!(
            effect.bounds_change,
            Some(BoundsChange::POSITION | BoundsChange::SIZE)
        );
    }
}
