//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Values are checked after parsing: the container kind must be a valid
//! kind, decorator names must exist in the decorator table, and the launch
//! ceiling must be at least 1.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::ContainerKind;
use crate::tree::decorate::DECORATOR_NAMES;

/// Contents of a config file.
///
/// # Example
///
/// ```toml
/// store = "/data/pathbind/store.json"
/// container_kind = "core"
///
/// [tree]
/// decorators = ["item", "uuid_first_12"]
///
/// [launch]
/// max_concurrent = 4
/// sleep_seconds = 60
/// logfile = "/data/pathbind/launch.log"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// JSON store file used when `--store` is not given
    pub store: Option<PathBuf>,

    /// Kind of the containers paths resolve within
    pub container_kind: Option<String>,

    /// Tree rendering defaults
    pub tree: Option<TreeConfig>,

    /// Launch loop defaults
    pub launch: Option<LaunchDefaults>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(kind) = &self.container_kind {
            ContainerKind::new(kind.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("container_kind '{}': {}", kind, e))
            })?;
        }
        if let Some(tree) = &self.tree {
            tree.validate()?;
        }
        if let Some(launch) = &self.launch {
            launch.validate()?;
        }
        Ok(())
    }
}

/// `[tree]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Decorator names applied by `show-tree` when none are given
    pub decorators: Option<Vec<String>>,
}

impl TreeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.decorators.iter().flatten() {
            if !DECORATOR_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown decorator '{}', must be one of: {}",
                    name,
                    DECORATOR_NAMES.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// `[launch]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchDefaults {
    pub max_concurrent: Option<usize>,
    pub sleep_seconds: Option<f64>,
    pub logfile: Option<PathBuf>,
}

impl LaunchDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == Some(0) {
            return Err(ConfigError::InvalidValue(
                "launch.max_concurrent must be at least 1".to_string(),
            ));
        }
        if let Some(secs) = self.sleep_seconds {
            if Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::InvalidValue(format!(
                    "launch.sleep_seconds must be a non-negative number of seconds, got {}",
                    secs
                )));
            }
        }
        Ok(())
    }
}
