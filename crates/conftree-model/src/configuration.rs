//! Container configuration values
//!
//! A [`Configuration`] is used both as a full, effective configuration and as
//! an override delta. As a delta, undefined fields (`None`, `Undefined`, empty
//! bounds, absent extras keys) leave the inherited value untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::merge::merge_maps;
use crate::window::WindowConfiguration;

/// Screen orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Undefined,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_undefined(&self) -> bool {
        *self == Orientation::Undefined
    }
}

/// A set of configuration attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Window-level attributes
    #[serde(skip_serializing_if = "WindowConfiguration::is_empty")]
    pub window: WindowConfiguration,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_dpi: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_width_dp: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_height_dp: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smallest_screen_width_dp: Option<u32>,

    #[serde(skip_serializing_if = "Orientation::is_undefined")]
    pub orientation: Orientation,

    /// BCP 47 language tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Host-defined attributes, deep-merged key by key
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

/// Replace `slot` with a defined `delta`
fn take_defined<T: PartialEq + Clone>(slot: &mut Option<T>, delta: &Option<T>) -> bool {
    match delta {
        Some(value) if slot.as_ref() != Some(value) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}

impl Configuration {
    /// The empty configuration
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no attribute is defined
    pub fn is_empty(&self) -> bool {
        *self == Configuration::default()
    }

    /// Apply every attribute defined in `delta`. Returns whether anything changed.
    pub fn update_from(&mut self, delta: &Configuration) -> bool {
        let mut changed = self.window.update_from(&delta.window);

        changed |= take_defined(&mut self.density_dpi, &delta.density_dpi);
        changed |= take_defined(&mut self.screen_width_dp, &delta.screen_width_dp);
        changed |= take_defined(&mut self.screen_height_dp, &delta.screen_height_dp);
        changed |= take_defined(
            &mut self.smallest_screen_width_dp,
            &delta.smallest_screen_width_dp,
        );
        if !delta.orientation.is_undefined() && delta.orientation != self.orientation {
            self.orientation = delta.orientation;
            changed = true;
        }
        changed |= take_defined(&mut self.locale, &delta.locale);
        changed |= merge_maps(&mut self.extras, &delta.extras);

        changed
    }

    /// `base` updated by `delta`, leaving both inputs untouched
    pub fn merged(base: &Configuration, delta: &Configuration) -> Configuration {
        let mut out = base.clone();
        out.update_from(delta);
        out
    }

    /// Names of the top-level attributes that differ between `self` and `other`
    pub fn diff(&self, other: &Configuration) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let (a, b) = (&self.window, &other.window);
        if a.bounds != b.bounds {
            fields.push("bounds");
        }
        if a.app_bounds != b.app_bounds {
            fields.push("app_bounds");
        }
        if a.windowing_mode != b.windowing_mode {
            fields.push("windowing_mode");
        }
        if a.display_windowing_mode != b.display_windowing_mode {
            fields.push("display_windowing_mode");
        }
        if a.activity_type != b.activity_type {
            fields.push("activity_type");
        }
        if a.always_on_top != b.always_on_top {
            fields.push("always_on_top");
        }
        if self.density_dpi != other.density_dpi {
            fields.push("density_dpi");
        }
        if self.screen_width_dp != other.screen_width_dp {
            fields.push("screen_width_dp");
        }
        if self.screen_height_dp != other.screen_height_dp {
            fields.push("screen_height_dp");
        }
        if self.smallest_screen_width_dp != other.smallest_screen_width_dp {
            fields.push("smallest_screen_width_dp");
        }
        if self.orientation != other.orientation {
            fields.push("orientation");
        }
        if self.locale != other.locale {
            fields.push("locale");
        }
        if self.extras != other.extras {
            fields.push("extras");
        }
        fields
    }
}
