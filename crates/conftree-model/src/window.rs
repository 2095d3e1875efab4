//! Window-level configuration
//!
//! Windowing mode, activity type, bounds and z-order hints. Every field has
//! an "undefined" value which means "inherit from the parent" when the
//! configuration is used as an override.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::ModelError;

/// How a container is laid out on its display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowingMode {
    #[default]
    Undefined,
    Fullscreen,
    Pinned,
    SplitScreenPrimary,
    SplitScreenSecondary,
    Freeform,
    MultiWindow,
}

impl WindowingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowingMode::Undefined => "undefined",
            WindowingMode::Fullscreen => "fullscreen",
            WindowingMode::Pinned => "pinned",
            WindowingMode::SplitScreenPrimary => "split_screen_primary",
            WindowingMode::SplitScreenSecondary => "split_screen_secondary",
            WindowingMode::Freeform => "freeform",
            WindowingMode::MultiWindow => "multi_window",
        }
    }

    pub fn is_undefined(&self) -> bool {
        *self == WindowingMode::Undefined
    }

    /// True for either half of split-screen
    pub fn is_split_screen(&self) -> bool {
        matches!(
            self,
            WindowingMode::SplitScreenPrimary | WindowingMode::SplitScreenSecondary
        )
    }
}

impl std::fmt::Display for WindowingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WindowingMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "undefined" => Ok(WindowingMode::Undefined),
            "fullscreen" => Ok(WindowingMode::Fullscreen),
            "pinned" => Ok(WindowingMode::Pinned),
            "split_screen_primary" => Ok(WindowingMode::SplitScreenPrimary),
            "split_screen_secondary" => Ok(WindowingMode::SplitScreenSecondary),
            "freeform" => Ok(WindowingMode::Freeform),
            "multi_window" => Ok(WindowingMode::MultiWindow),
            _ => Err(ModelError::UnknownWindowingMode(s.to_string())),
        }
    }
}

/// Classification of the activities a container holds.
///
/// Once a container's effective activity type is defined it may not be
/// changed to a different defined type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    Undefined,
    Standard,
    Home,
    Recents,
    Assistant,
    Dream,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Undefined => "undefined",
            ActivityType::Standard => "standard",
            ActivityType::Home => "home",
            ActivityType::Recents => "recents",
            ActivityType::Assistant => "assistant",
            ActivityType::Dream => "dream",
        }
    }

    pub fn is_undefined(&self) -> bool {
        *self == ActivityType::Undefined
    }

    /// Standard or not yet classified
    pub fn is_standard_or_undefined(&self) -> bool {
        matches!(self, ActivityType::Standard | ActivityType::Undefined)
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "undefined" => Ok(ActivityType::Undefined),
            "standard" => Ok(ActivityType::Standard),
            "home" => Ok(ActivityType::Home),
            "recents" => Ok(ActivityType::Recents),
            "assistant" => Ok(ActivityType::Assistant),
            "dream" => Ok(ActivityType::Dream),
            _ => Err(ModelError::UnknownActivityType(s.to_string())),
        }
    }
}

/// Tri-state always-on-top flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlwaysOnTop {
    #[default]
    Undefined,
    On,
    Off,
}

impl AlwaysOnTop {
    pub fn is_undefined(&self) -> bool {
        *self == AlwaysOnTop::Undefined
    }
}

impl From<bool> for AlwaysOnTop {
    fn from(on: bool) -> Self {
        if on {
            AlwaysOnTop::On
        } else {
            AlwaysOnTop::Off
        }
    }
}

/// Window part of a [`Configuration`](crate::Configuration)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfiguration {
    /// Container bounds; empty means "inherit"
    #[serde(skip_serializing_if = "Rect::is_empty")]
    pub bounds: Rect,

    /// Bounds usable by application content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_bounds: Option<Rect>,

    #[serde(skip_serializing_if = "WindowingMode::is_undefined")]
    pub windowing_mode: WindowingMode,

    /// Windowing mode of the display hosting the container
    #[serde(skip_serializing_if = "WindowingMode::is_undefined")]
    pub display_windowing_mode: WindowingMode,

    #[serde(skip_serializing_if = "ActivityType::is_undefined")]
    pub activity_type: ActivityType,

    #[serde(skip_serializing_if = "AlwaysOnTop::is_undefined")]
    pub always_on_top: AlwaysOnTop,
}

impl WindowConfiguration {
    /// True when no field is defined
    pub fn is_empty(&self) -> bool {
        *self == WindowConfiguration::default()
    }

    /// Overwrite every field that `delta` defines. Returns whether anything changed.
    pub fn update_from(&mut self, delta: &WindowConfiguration) -> bool {
        let mut changed = false;

        if !delta.bounds.is_empty() && delta.bounds != self.bounds {
            self.bounds = delta.bounds;
            changed = true;
        }
        if delta.app_bounds.is_some() && delta.app_bounds != self.app_bounds {
            self.app_bounds = delta.app_bounds;
            changed = true;
        }
        if !delta.windowing_mode.is_undefined() && delta.windowing_mode != self.windowing_mode {
            self.windowing_mode = delta.windowing_mode;
            changed = true;
        }
        if !delta.display_windowing_mode.is_undefined()
            && delta.display_windowing_mode != self.display_windowing_mode
        {
            self.display_windowing_mode = delta.display_windowing_mode;
            changed = true;
        }
        if !delta.activity_type.is_undefined() && delta.activity_type != self.activity_type {
            self.activity_type = delta.activity_type;
            changed = true;
        }
        if !delta.always_on_top.is_undefined() && delta.always_on_top != self.always_on_top {
            self.always_on_top = delta.always_on_top;
            changed = true;
        }

        changed
    }

    /// Set bounds; `None` clears them
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds.unwrap_or_default();
    }

    /// Whether a container with this configuration may enter split-screen
    pub fn supports_split_screen_windowing_mode(&self) -> bool {
        !matches!(
            self.activity_type,
            ActivityType::Assistant | ActivityType::Dream
        )
    }

    pub fn is_always_on_top(&self) -> bool {
        self.always_on_top == AlwaysOnTop::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_skips_undefined() {
        let mut base = WindowConfiguration {
            bounds: Rect::new(0, 0, 100, 100),
            windowing_mode: WindowingMode::Fullscreen,
            activity_type: ActivityType::Standard,
            ..Default::default()
        };
        let before = base.clone();

        let changed = base.update_from(&WindowConfiguration::default());

        assert!(!changed);
        assert_eq!(base, before);
    }

    #[test]
    fn test_update_from_overrides_defined_fields() {
        let mut base = WindowConfiguration {
            bounds: Rect::new(0, 0, 100, 100),
            windowing_mode: WindowingMode::Fullscreen,
            ..Default::default()
        };
        let delta = WindowConfiguration {
            windowing_mode: WindowingMode::Pinned,
            always_on_top: AlwaysOnTop::On,
            ..Default::default()
        };

        assert!(base.update_from(&delta));
        assert_eq!(base.bounds, Rect::new(0, 0, 100, 100));
        assert_eq!(base.windowing_mode, WindowingMode::Pinned);
        assert!(base.is_always_on_top());
    }

    #[test]
    fn test_update_from_same_value_is_not_a_change() {
        let mut base = WindowConfiguration {
            windowing_mode: WindowingMode::Freeform,
            ..Default::default()
        };
        let delta = base.clone();
        assert!(!base.update_from(&delta));
    }

    #[test]
    fn test_windowing_mode_parse() {
        assert_eq!(
            "split-screen-primary".parse::<WindowingMode>().unwrap(),
            WindowingMode::SplitScreenPrimary
        );
        assert_eq!(
            "FULLSCREEN".parse::<WindowingMode>().unwrap(),
            WindowingMode::Fullscreen
        );
        assert!("tiled".parse::<WindowingMode>().is_err());
    }

    #[test]
    fn test_activity_type_parse() {
        assert_eq!("home".parse::<ActivityType>().unwrap(), ActivityType::Home);
        assert!("launcher".parse::<ActivityType>().is_err());
    }

    #[test]
    fn test_split_screen_support() {
        let mut wc = WindowConfiguration::default();
        assert!(wc.supports_split_screen_windowing_mode());
        wc.activity_type = ActivityType::Assistant;
        assert!(!wc.supports_split_screen_windowing_mode());
        wc.activity_type = ActivityType::Home;
        assert!(wc.supports_split_screen_windowing_mode());
    }

    #[test]
    fn test_serialize_skips_undefined() {
        let wc = WindowConfiguration {
            windowing_mode: WindowingMode::Pinned,
            ..Default::default()
        };
        let json = serde_json::to_value(&wc).unwrap();
        assert_eq!(json, serde_json::json!({"windowing_mode": "pinned"}));
    }
}
