//! Declarative scenarios
//!
//! A scenario is a TOML file that declares a tree of containers and then a
//! list of steps that mutate it:
//!
//! ```toml
//! name = "split screen"
//!
//! [[node]]
//! name = "display"
//! [node.override.window]
//! bounds = { left = 0, top = 0, right = 1080, bottom = 1920 }
//! windowing_mode = "fullscreen"
//!
//! [[node]]
//! name = "task"
//! parent = "display"
//! policy = "bounds_within_parent"
//!
//! [[step]]
//! op = "set_windowing_mode"
//! node = "task"
//! mode = "split_screen_primary"
//! ```
//!
//! Running a scenario produces a [`RunReport`] with the final snapshot, the
//! per-step outcomes and (optionally) every listener callback the steps
//! triggered.

mod step;

pub use step::Step;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use conftree_model::Configuration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EffectiveSettings;
use crate::dump::TreeSnapshot;
use crate::tree::{
    policy_by_name, BoundsChange, ConfigTree, EventLog, ListenerEvent, NodeId, TreeError,
};

/// A container declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,

    /// Must name a container declared earlier in the file
    #[serde(default)]
    pub parent: Option<String>,

    /// Falls back to the `policy.default` setting
    #[serde(default)]
    pub policy: Option<String>,

    /// Initial requested override
    #[serde(default, rename = "override")]
    pub configuration: Configuration,

    #[serde(default)]
    pub focusable: Option<bool>,
}

/// A parsed scenario file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeSpec>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Result of one applied step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    pub node: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_change: Option<BoundsChange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_changed: Option<bool>,

    /// Containers removed, including the target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,

    /// Listener callbacks triggered by this step
    pub events: usize,
}

/// Everything a scenario run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    pub snapshot: TreeSnapshot,

    pub steps: Vec<StepOutcome>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ListenerEvent>,

    /// `dump_children_names` output for every root
    #[serde(skip)]
    pub layout: String,
}

impl RunReport {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text summary for terminals
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.scenario {
            out.push_str(&format!("Scenario: {}\n", name));
        }
        out.push_str(&format!("Steps applied: {}\n", self.steps.len()));
        for outcome in &self.steps {
            out.push_str(&format!("  [{}] {} {}", outcome.index, outcome.op, outcome.node));
            if let Some(change) = outcome.bounds_change {
                if change.is_none() {
                    out.push_str(" (bounds unchanged)");
                } else {
                    out.push_str(&format!(" ({})", change.describe().join(", ")));
                }
            }
            if let Some(removed) = outcome.removed {
                out.push_str(&format!(" ({} removed)", removed));
            }
            if outcome.events > 0 {
                out.push_str(&format!(" -> {} events", outcome.events));
            }
            out.push('\n');
        }
        if !self.events.is_empty() {
            out.push_str(&format!("Listener events: {}\n", self.events.len()));
        }
        out.push_str("\nTree:\n");
        out.push_str(&self.layout);
        out
    }
}

/// Scenario errors
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Duplicate node name '{0}'")]
    DuplicateNode(String),

    #[error("Unknown node '{0}'")]
    UnknownNode(String),

    #[error("Unknown policy '{policy}' for node '{node}'")]
    UnknownPolicy { node: String, policy: String },

    #[error("Failed to build node '{node}': {source}")]
    Build {
        node: String,
        #[source]
        source: TreeError,
    },

    #[error("Step {index} ({op}) failed: {source}")]
    Step {
        index: usize,
        op: &'static str,
        #[source]
        source: TreeError,
    },
}

impl Scenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            nodes = scenario.nodes.len(),
            steps = scenario.steps.len(),
            "loaded scenario"
        );
        Ok(scenario)
    }

    /// Parse and validate scenario TOML
    pub fn from_toml_str(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario =
            toml::from_str(contents).map_err(|e| ScenarioError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check names and policies without building anything.
    ///
    /// Step targets are only checked against the declared names; a step
    /// that targets a container removed by an earlier step fails at run time.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut declared = HashSet::new();
        for spec in &self.nodes {
            if let Some(parent) = &spec.parent {
                if !declared.contains(parent.as_str()) {
                    return Err(ScenarioError::UnknownNode(parent.clone()));
                }
            }
            if let Some(policy) = &spec.policy {
                if policy_by_name(policy).is_none() {
                    return Err(ScenarioError::UnknownPolicy {
                        node: spec.name.clone(),
                        policy: policy.clone(),
                    });
                }
            }
            if !declared.insert(spec.name.as_str()) {
                return Err(ScenarioError::DuplicateNode(spec.name.clone()));
            }
        }

        for step in &self.steps {
            for name in std::iter::once(step.node()).chain(step.referenced_parent()) {
                if !declared.contains(name) {
                    return Err(ScenarioError::UnknownNode(name.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Build the declared tree. Returns the tree and the name index.
    pub fn build(
        &self,
        settings: &EffectiveSettings,
    ) -> Result<(ConfigTree, HashMap<String, NodeId>), ScenarioError> {
        let mut tree = ConfigTree::new();
        let mut ids: HashMap<String, NodeId> = HashMap::new();

        for spec in &self.nodes {
            if ids.contains_key(&spec.name) {
                return Err(ScenarioError::DuplicateNode(spec.name.clone()));
            }
            let policy_name = spec.policy.as_deref().unwrap_or(settings.default_policy());
            let policy = policy_by_name(policy_name).ok_or_else(|| ScenarioError::UnknownPolicy {
                node: spec.name.clone(),
                policy: policy_name.to_string(),
            })?;

            let id = match &spec.parent {
                Some(parent) => {
                    let parent = lookup(&ids, parent)?;
                    tree.add_child_with_policy(parent, spec.name.clone(), policy)
                }
                None => Ok(tree.create_node_with_policy(spec.name.clone(), policy)),
            }
            .map_err(|source| ScenarioError::Build {
                node: spec.name.clone(),
                source,
            })?;

            let setup = |tree: &mut ConfigTree| -> Result<(), TreeError> {
                if !spec.configuration.is_empty() {
                    tree.set_requested_override(id, spec.configuration.clone())?;
                }
                if let Some(focusable) = spec.focusable {
                    tree.set_focusable(id, focusable)?;
                }
                Ok(())
            };
            setup(&mut tree).map_err(|source| ScenarioError::Build {
                node: spec.name.clone(),
                source,
            })?;

            ids.insert(spec.name.clone(), id);
        }

        Ok((tree, ids))
    }

    /// Build the tree, apply every step and report the outcome
    pub fn run(&self, settings: &EffectiveSettings) -> Result<RunReport, ScenarioError> {
        let (mut tree, ids) = self.build(settings)?;

        let log = EventLog::new();
        if settings.record_events() {
            for (name, id) in &ids {
                tree.register_listener(*id, log.listener_for(name.clone()))
                    .map_err(|source| ScenarioError::Build {
                        node: name.clone(),
                        source,
                    })?;
            }
            // Drop the initial sync callbacks; only step effects are reported
            log.clear();
        }

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let fail = |source| ScenarioError::Step {
                index,
                op: step.op(),
                source,
            };

            let id = lookup(&ids, step.node())?;
            if !tree.contains(id) {
                return Err(ScenarioError::UnknownNode(step.node().to_string()));
            }
            let parent = match step.referenced_parent() {
                Some(name) => Some(lookup(&ids, name)?),
                None => None,
            };

            let before = log.len();
            let effect = step.apply(&mut tree, id, parent).map_err(fail)?;
            let events = log.len() - before;
            debug!(index, op = step.op(), node = step.node(), events, "applied step");

            outcomes.push(StepOutcome {
                index,
                op: step.op(),
                node: step.node().to_string(),
                bounds_change: effect.bounds_change,
                focus_changed: effect.focus_changed,
                removed: effect.removed,
                events,
            });
        }

        let mut layout = String::new();
        for root in tree.roots() {
            if let Ok(names) = tree.dump_children_names(root) {
                layout.push_str(&names);
            }
        }

        info!(
            scenario = self.name.as_deref().unwrap_or("<unnamed>"),
            steps = outcomes.len(),
            events = log.len(),
            "scenario complete"
        );

        Ok(RunReport {
            scenario: self.name.clone(),
            snapshot: tree.snapshot(settings.dump_level()),
            steps: outcomes,
            events: log.events(),
            layout,
        })
    }
}

fn lookup(ids: &HashMap<String, NodeId>, name: &str) -> Result<NodeId, ScenarioError> {
    ids.get(name)
        .copied()
        .ok_or_else(|| ScenarioError::UnknownNode(name.to_string()))
}
