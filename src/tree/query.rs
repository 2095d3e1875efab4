//! Windowing mode, activity type and focus
//!
//! Queries read the full configuration; mutators rewrite one field of the
//! requested override and propagate.

use conftree_model::{ActivityType, AlwaysOnTop, WindowingMode};
use tracing::warn;

use super::{ConfigTree, NodeId, NodeRef, TreeError};

/// Two activity types are compatible when equal, or when either one is
/// undefined. Assistant is only compatible with itself.
pub fn has_compatible_activity_type(this: ActivityType, other: ActivityType) -> bool {
    if this == other {
        return true;
    }
    if this == ActivityType::Assistant {
        return false;
    }
    this.is_undefined() || other.is_undefined()
}

impl<'a> NodeRef<'a> {
    pub fn windowing_mode(&self) -> WindowingMode {
        self.window_configuration().windowing_mode
    }

    pub fn requested_override_windowing_mode(&self) -> WindowingMode {
        self.requested_override().window.windowing_mode
    }

    pub fn activity_type(&self) -> ActivityType {
        self.window_configuration().activity_type
    }

    /// Sharing the screen with other containers
    pub fn in_multi_window_mode(&self) -> bool {
        !matches!(
            self.windowing_mode(),
            WindowingMode::Fullscreen | WindowingMode::Undefined
        )
    }

    pub fn in_split_screen_windowing_mode(&self) -> bool {
        self.windowing_mode().is_split_screen()
    }

    pub fn in_split_screen_primary_windowing_mode(&self) -> bool {
        self.windowing_mode() == WindowingMode::SplitScreenPrimary
    }

    pub fn in_split_screen_secondary_windowing_mode(&self) -> bool {
        self.windowing_mode() == WindowingMode::SplitScreenSecondary
    }

    pub fn supports_split_screen_windowing_mode(&self) -> bool {
        self.window_configuration()
            .supports_split_screen_windowing_mode()
    }

    pub fn in_pinned_windowing_mode(&self) -> bool {
        self.windowing_mode() == WindowingMode::Pinned
    }

    pub fn in_freeform_windowing_mode(&self) -> bool {
        self.windowing_mode() == WindowingMode::Freeform
    }

    pub fn is_activity_type_home(&self) -> bool {
        self.activity_type() == ActivityType::Home
    }

    pub fn is_activity_type_recents(&self) -> bool {
        self.activity_type() == ActivityType::Recents
    }

    pub fn is_activity_type_assistant(&self) -> bool {
        self.activity_type() == ActivityType::Assistant
    }

    pub fn is_activity_type_standard(&self) -> bool {
        self.activity_type() == ActivityType::Standard
    }

    pub fn is_activity_type_standard_or_undefined(&self) -> bool {
        self.activity_type().is_standard_or_undefined()
    }

    pub fn has_compatible_activity_type(&self, other: &NodeRef<'_>) -> bool {
        has_compatible_activity_type(self.activity_type(), other.activity_type())
    }

    /// Whether this container can host content of the given windowing mode
    /// and activity type.
    ///
    /// Defined non-standard activity types only need the activity type to
    /// match; standard or undefined ones need the windowing mode to match.
    pub fn is_compatible(&self, windowing_mode: WindowingMode, activity_type: ActivityType) -> bool {
        let same_activity_type = self.activity_type() == activity_type;
        let same_windowing_mode = self.windowing_mode() == windowing_mode;

        if same_activity_type && same_windowing_mode {
            return true;
        }

        if !activity_type.is_standard_or_undefined() || !self.is_activity_type_standard_or_undefined() {
            return same_activity_type;
        }

        same_windowing_mode
    }

    pub fn is_always_on_top(&self) -> bool {
        self.window_configuration().is_always_on_top()
    }
}

impl ConfigTree {
    pub fn set_windowing_mode(&mut self, id: NodeId, mode: WindowingMode) -> Result<(), TreeError> {
        self.update_requested_override(id, |requested| requested.window.windowing_mode = mode)
    }

    /// Windowing mode of the display hosting `id`
    pub fn set_display_windowing_mode(
        &mut self,
        id: NodeId,
        mode: WindowingMode,
    ) -> Result<(), TreeError> {
        self.update_requested_override(id, |requested| {
            requested.window.display_windowing_mode = mode;
        })
    }

    pub fn set_always_on_top(&mut self, id: NodeId, always_on_top: bool) -> Result<(), TreeError> {
        self.update_requested_override(id, |requested| {
            requested.window.always_on_top = AlwaysOnTop::from(always_on_top);
        })
    }

    /// Classify `id`. The activity type can be set once; asking for the
    /// current type again is a no-op, asking for a different one fails.
    pub fn set_activity_type(
        &mut self,
        id: NodeId,
        activity_type: ActivityType,
    ) -> Result<(), TreeError> {
        let current = self.node(id)?.activity_type();
        if current == activity_type {
            return Ok(());
        }
        if !current.is_undefined() {
            warn!(node = %id, %current, requested = %activity_type, "activity type already set");
            return Err(TreeError::ActivityTypeAlreadySet {
                node: id,
                current,
                requested: activity_type,
            });
        }
        self.update_requested_override(id, |requested| {
            requested.window.activity_type = activity_type;
        })
    }

    /// Returns whether the flag changed
    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) -> Result<bool, TreeError> {
        let node = self.slot_mut(id)?;
        let changed = node.focusable != focusable;
        node.focusable = focusable;
        Ok(changed)
    }
}
