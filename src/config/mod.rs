//! Layered settings
//!
//! Settings are merged from four layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host config (~/.config/conftree/config.toml)
//! 3. Project config (./conftree.toml)
//! 4. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinDefaults;
pub use effective::{
    default_host_config_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings,
    OutputFormat, PROJECT_CONFIG_FILE,
};
