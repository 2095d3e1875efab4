//! Debug dumps of a configuration tree
//!
//! Two forms: a structured [`TreeSnapshot`] (JSON) whose detail depends on
//! the [`DumpLevel`], and a compact one-line-per-container name listing.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use conftree_model::Configuration;
use serde::{Deserialize, Serialize};

use crate::tree::{ConfigTree, NodeId, NodeRef, TreeError};

/// Schema version for tree snapshots
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "conftree/tree_snapshot@1";

/// How much configuration detail a snapshot records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpLevel {
    /// Requested, full and merged configuration for every container
    All,
    /// Requested override of containers that have one
    #[default]
    Trim,
    /// Window part of the requested override of containers that have one
    Critical,
}

impl DumpLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DumpLevel::All => "all",
            DumpLevel::Trim => "trim",
            DumpLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for DumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DumpLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DumpLevel::All),
            "trim" => Ok(DumpLevel::Trim),
            "critical" => Ok(DumpLevel::Critical),
            _ => Err(format!("unknown dump level '{}' (expected all, trim or critical)", s)),
        }
    }
}

/// Configuration record of one container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDump {
    pub requested_override: Configuration,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_configuration: Option<Configuration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_override: Option<Configuration>,
}

/// One container. Links are ids so the snapshot stays flat at any depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub policy: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<NodeId>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<NodeId>,

    /// Omitted below [`DumpLevel::All`] when the container has no override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ContainerDump>,
}

/// Snapshot of every tree in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,
    pub level: DumpLevel,
    pub roots: Vec<NodeId>,

    /// Every container, each tree in pre-order
    pub nodes: Vec<NodeSnapshot>,
}

impl TreeSnapshot {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find a container by name
    pub fn find(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Root containers in arena order
    pub fn root_nodes(&self) -> Vec<&NodeSnapshot> {
        self.roots.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// Children of `id` in child order
    pub fn children_of(&self, id: NodeId) -> Vec<&NodeSnapshot> {
        self.get(id)
            .map(|node| node.children.iter().filter_map(|child| self.get(*child)).collect())
            .unwrap_or_default()
    }
}

fn container_dump(node: &NodeRef<'_>, level: DumpLevel) -> Option<ContainerDump> {
    if level != DumpLevel::All && !node.has_override_configuration() {
        return None;
    }

    let requested_override = match level {
        DumpLevel::Critical => Configuration {
            window: node.requested_override().window.clone(),
            ..Default::default()
        },
        _ => node.requested_override().clone(),
    };

    let (full_configuration, merged_override) = if level == DumpLevel::All {
        (
            Some(node.configuration().clone()),
            Some(node.merged_override().clone()),
        )
    } else {
        (None, None)
    };

    Some(ContainerDump {
        requested_override,
        full_configuration,
        merged_override,
    })
}

impl ConfigTree {
    /// Structured snapshot of all trees
    pub fn snapshot(&self, level: DumpLevel) -> TreeSnapshot {
        let roots = self.roots();
        let nodes = roots
            .iter()
            .filter_map(|root| self.descendants(*root).ok())
            .flatten()
            .filter_map(|id| self.snapshot_node(id, level))
            .collect();

        TreeSnapshot {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            level,
            roots,
            nodes,
        }
    }

    /// Record of a single container
    pub fn snapshot_node(&self, id: NodeId, level: DumpLevel) -> Option<NodeSnapshot> {
        let node = self.get(id)?;
        Some(NodeSnapshot {
            id,
            name: node.name().to_string(),
            policy: node.policy_name().to_string(),
            parent: node.parent(),
            children: node.children().to_vec(),
            configuration: container_dump(&node, level),
        })
    }

    /// One line per container:
    /// `<name> type=<activity> mode=<mode> override-mode=<requested mode>`,
    /// with children indented one space and numbered, last child first.
    pub fn dump_children_names(&self, id: NodeId) -> Result<String, TreeError> {
        self.node(id)?;
        let mut out = String::new();
        // (container, depth, index within its parent)
        let mut stack: Vec<(NodeId, usize, Option<usize>)> = vec![(id, 0, None)];

        while let Some((current, depth, index)) = stack.pop() {
            let node = self.node(current)?;
            out.extend(std::iter::repeat(' ').take(depth));
            if let Some(index) = index {
                let _ = write!(out, "#{} ", index);
            }
            let _ = writeln!(
                out,
                "{} type={} mode={} override-mode={}",
                node.name(),
                node.activity_type(),
                node.windowing_mode(),
                node.requested_override_windowing_mode()
            );

            // Popping from the end prints the last child first
            stack.extend(
                node.children()
                    .iter()
                    .enumerate()
                    .map(|(i, child)| (*child, depth + 1, Some(i))),
            );
        }
        Ok(out)
    }
}
