//! Configuration values for hierarchical override propagation.
//!
//! Provides the attribute set carried by every container in a configuration
//! tree, the "update-from" rule that layers an override on top of inherited
//! values, and the JSON merge primitives shared with the settings loader.

mod configuration;
mod geometry;
mod merge;
mod window;

pub use configuration::{Configuration, Orientation};
pub use geometry::{Point, Rect};
pub use merge::{deep_merge, deep_merge_into, merge_layers, merge_maps};
pub use window::{ActivityType, AlwaysOnTop, WindowConfiguration, WindowingMode};

/// Errors produced when parsing model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown windowing mode: {0}")]
    UnknownWindowingMode(String),

    #[error("Unknown activity type: {0}")]
    UnknownActivityType(String),
}
