//! Override resolution policies
//!
//! A policy turns a container's requested override into the resolved
//! override, given the parent's full configuration. The resolved override
//! is what gets layered into the full and merged configurations.

use conftree_model::{Configuration, Rect, WindowingMode};

/// Constraint hook applied to every requested override
pub trait OverridePolicy {
    /// Stable name used in settings, scenarios and dumps
    fn name(&self) -> &str;

    /// Resolve `requested` against the parent's full configuration
    fn resolve(&self, requested: &Configuration, parent_full: &Configuration) -> Configuration;
}

/// Resolved override is the request, unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl OverridePolicy for PassThrough {
    fn name(&self) -> &str {
        "pass_through"
    }

    fn resolve(&self, requested: &Configuration, _parent_full: &Configuration) -> Configuration {
        requested.clone()
    }
}

/// Clamps requested bounds to the parent's bounds.
///
/// A parent without bounds imposes no constraint. Requested bounds that do
/// not overlap the parent resolve to empty, so the container inherits.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsWithinParent;

impl OverridePolicy for BoundsWithinParent {
    fn name(&self) -> &str {
        "bounds_within_parent"
    }

    fn resolve(&self, requested: &Configuration, parent_full: &Configuration) -> Configuration {
        let mut resolved = requested.clone();
        let parent_bounds = parent_full.window.bounds;
        if !requested.window.bounds.is_empty() && !parent_bounds.is_empty() {
            resolved.window.bounds = requested
                .window
                .bounds
                .intersect(&parent_bounds)
                .unwrap_or_else(Rect::empty);
        }
        resolved
    }
}

/// Containers that can only be fullscreen: any requested windowing mode
/// becomes fullscreen and requested bounds are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullscreenOnly;

impl OverridePolicy for FullscreenOnly {
    fn name(&self) -> &str {
        "fullscreen_only"
    }

    fn resolve(&self, requested: &Configuration, _parent_full: &Configuration) -> Configuration {
        let mut resolved = requested.clone();
        if !resolved.window.windowing_mode.is_undefined() {
            resolved.window.windowing_mode = WindowingMode::Fullscreen;
        }
        resolved.window.bounds = Rect::empty();
        resolved
    }
}

/// Names accepted by [`policy_by_name`]
pub const POLICY_NAMES: &[&str] = &["pass_through", "bounds_within_parent", "fullscreen_only"];

/// Look up a built-in policy
pub fn policy_by_name(name: &str) -> Option<Box<dyn OverridePolicy>> {
    match name {
        "pass_through" => Some(Box::new(PassThrough)),
        "bounds_within_parent" => Some(Box::new(BoundsWithinParent)),
        "fullscreen_only" => Some(Box::new(FullscreenOnly)),
        _ => None,
    }
}
