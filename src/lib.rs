//! conftree - hierarchical configuration override propagation
//!
//! Containers form a tree. Each one may request an override configuration;
//! an override policy resolves it against the parent, and the result is
//! merged down the tree into a full configuration per container. Listeners
//! observe changes to the resolved and merged overrides.

pub mod config;
pub mod dump;
pub mod logging;
pub mod scenario;
pub mod tree;

pub use config::{ConfigError, EffectiveSettings, OutputFormat};
pub use dump::{DumpLevel, TreeSnapshot};
pub use scenario::{RunReport, Scenario, ScenarioError, Step};
pub use tree::{
    BoundsChange, ConfigTree, ConfigurationListener, EventLog, NodeId, NodeRef, OverridePolicy,
    TreeError,
};

pub use conftree_model::{
    ActivityType, AlwaysOnTop, Configuration, Rect, WindowConfiguration, WindowingMode,
};
