//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$PATHBIND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/pathbind/config.toml`
//! 3. `~/.pathbind/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use pathbind::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! for warning in &result.warnings {
//!     eprintln!("{}", warning.message);
//! }
//! let config = result.config;
//! println!("kind: {}", config.container_kind());
//! println!("decorators: {:?}", config.tree_decorators());
//! ```

pub mod schema;

pub use schema::{FileConfig, LaunchDefaults, TreeConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::ContainerKind;
use crate::launch::LaunchConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PATHBIND_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    /// Path the config was read from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. A missing file is not an error.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::load_from(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
            warnings.push(ConfigWarning {
                message: format!("{} points to a missing file, ignoring it", CONFIG_ENV),
                path,
            });
        }

        for path in Self::search_paths() {
            if path.exists() {
                let config = Self::load_from(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Candidate locations after `$PATHBIND_CONFIG`.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("pathbind/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".pathbind/config.toml"));
        }
        paths
    }

    /// Read, parse and validate one config file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Path the config was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store file from the config, if set.
    pub fn store_path(&self) -> Option<&Path> {
        self.file.store.as_deref()
    }

    /// Container kind paths resolve within.
    ///
    /// Defaults to `core`.
    pub fn container_kind(&self) -> ContainerKind {
        self.file
            .container_kind
            .as_deref()
            .and_then(|k| ContainerKind::new(k).ok())
            .unwrap_or_default()
    }

    /// Decorator names for `show-tree`.
    ///
    /// Defaults to `["item"]`.
    pub fn tree_decorators(&self) -> Vec<String> {
        self.file
            .tree
            .as_ref()
            .and_then(|t| t.decorators.clone())
            .unwrap_or_else(|| vec!["item".to_string()])
    }

    /// Launch settings with config values applied over the defaults.
    pub fn launch_config(&self) -> LaunchConfig {
        let mut config = LaunchConfig::default();
        if let Some(launch) = &self.file.launch {
            if let Some(max) = launch.max_concurrent {
                config.max_concurrent = max;
            }
            if let Some(sleep) = launch
                .sleep_seconds
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            {
                config.sleep = sleep;
            }
            config.logfile = launch.logfile.clone();
        }
        config
    }
}
