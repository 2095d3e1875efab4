//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Snapshot detail (default: "trim")
    pub dump_level: String,

    /// Report format (default: "json")
    pub output_format: String,

    /// Tracing filter directive when RUST_LOG is unset (default: "warn")
    pub log_filter: String,

    /// Policy for scenario containers that name none (default: "pass_through")
    pub default_policy: String,

    /// Record listener callbacks in run reports (default: true)
    pub record_events: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            dump_level: "trim".to_string(),
            output_format: "json".to_string(),
            log_filter: "warn".to_string(),
            default_policy: "pass_through".to_string(),
            record_events: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "dump": {
                "level": self.dump_level
            },
            "output": {
                "format": self.output_format
            },
            "log": {
                "filter": self.log_filter
            },
            "policy": {
                "default": self.default_policy
            },
            "events": {
                "record": self.record_events
            }
        })
    }
}
