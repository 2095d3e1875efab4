//! Effective settings with provenance
//!
//! Captures the merged settings plus where each contributing layer came from.

use chrono::{DateTime, Utc};
use conftree_model::merge_layers;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use crate::dump::DumpLevel;
use crate::tree::POLICY_NAMES;

/// Schema version for effective settings
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "conftree/effective_settings@1";

/// Project-level settings file, relative to the working directory
pub const PROJECT_CONFIG_FILE: &str = "conftree.toml";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    Project,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(ConfigError::ValidationError(format!(
                "output.format must be json or human, got '{}'",
                s
            ))),
        }
    }
}

/// Merged settings and their sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,
    pub schema_id: String,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub config: Value,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,
}

/// Default host settings path, when HOME is known
pub fn default_host_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/conftree/config.toml"))
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: BuiltinDefaults::default().to_value(),
            sources: vec![ConfigSource {
                origin: ConfigOrigin::Builtin,
                path: None,
                digest: None,
            }],
        }
    }
}

impl EffectiveSettings {
    /// Build settings from layers. Missing files are skipped.
    pub fn build(
        host_config_path: Option<&Path>,
        project_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        let mut layers = vec![settings.config.take()];

        for (origin, path) in [
            (ConfigOrigin::Host, host_config_path),
            (ConfigOrigin::Project, project_config_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = Self::load_toml_file(path)?;
            tracing::debug!(path = %path.display(), %digest, "loaded settings layer");
            layers.push(value);
            settings.sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            settings.sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        settings.config = merge_layers(layers);
        Self::validate(&settings.config)?;
        Ok(settings)
    }

    /// Read a TOML file, returning its value and SHA-256 digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;
        let value: Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((value, digest))
    }

    fn validate(config: &Value) -> Result<(), ConfigError> {
        if let Some(level) = config.pointer("/dump/level") {
            let level = level.as_str().ok_or_else(|| {
                ConfigError::ValidationError("dump.level must be a string".to_string())
            })?;
            level
                .parse::<DumpLevel>()
                .map_err(ConfigError::ValidationError)?;
        }

        if let Some(format) = config.pointer("/output/format") {
            let format = format.as_str().ok_or_else(|| {
                ConfigError::ValidationError("output.format must be a string".to_string())
            })?;
            format.parse::<OutputFormat>()?;
        }

        if let Some(policy) = config.pointer("/policy/default") {
            let known = policy
                .as_str()
                .map(|name| POLICY_NAMES.contains(&name))
                .unwrap_or(false);
            if !known {
                return Err(ConfigError::ValidationError(format!(
                    "policy.default must be one of {}",
                    POLICY_NAMES.join(", ")
                )));
            }
        }

        if let Some(filter) = config.pointer("/log/filter") {
            if filter.as_str().map_or(true, str::is_empty) {
                return Err(ConfigError::ValidationError(
                    "log.filter must be a non-empty string".to_string(),
                ));
            }
        }

        if let Some(record) = config.pointer("/events/record") {
            if !record.is_boolean() {
                return Err(ConfigError::ValidationError(
                    "events.record must be a boolean".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a settings value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    pub fn dump_level(&self) -> DumpLevel {
        self.get_str("dump.level")
            .and_then(|level| level.parse().ok())
            .unwrap_or_default()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.get_str("output.format")
            .and_then(|format| format.parse().ok())
            .unwrap_or(OutputFormat::Json)
    }

    pub fn log_filter(&self) -> &str {
        self.get_str("log.filter").unwrap_or("warn")
    }

    pub fn default_policy(&self) -> &str {
        self.get_str("policy.default").unwrap_or("pass_through")
    }

    pub fn record_events(&self) -> bool {
        self.get_bool("events.record").unwrap_or(true)
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
