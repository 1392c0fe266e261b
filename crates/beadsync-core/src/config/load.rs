//! Configuration loading from files and environment
//!
//! 1. Built-in defaults
//! 2. Global config: `<config dir>/beadsync/config.toml`
//! 3. Project config: `.beadsync/config.toml`
//! 4. Environment variables: `BEADSYNC_*`
//!
//! Command-line flags are applied by the binary on top of the result.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use super::types::{Config, PartialConfig};
use crate::error::{Error, Result};

/// Directory holding the project config, relative to the project root.
pub const PROJECT_CONFIG_DIR: &str = ".beadsync";

const CONFIG_FILE: &str = "config.toml";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration for the current directory.
///
/// # Errors
///
/// Returns error if:
/// - The current directory cannot be determined
/// - A config file is unreadable or malformed TOML
/// - An environment override does not parse
/// - The merged values fail validation
pub fn load_config() -> Result<Config> {
    let project_dir = std::env::current_dir()
        .map_err(|e| Error::io_error(format!("Failed to get current directory: {e}")))?;
    load_config_from(global_config_path().as_deref(), &project_dir)
}

/// Load configuration with an explicit global file and project root.
///
/// Missing files are skipped.
pub fn load_config_from(global_path: Option<&Path>, project_dir: &Path) -> Result<Config> {
    let config = Config::default();

    let config = match global_path.filter(|path| path.exists()) {
        Some(path) => config.merge_partial(load_toml_file(path)?),
        None => config,
    };

    let project_path = project_config_path(project_dir);
    let config = if project_path.exists() {
        config.merge_partial(load_toml_file(&project_path)?)
    } else {
        config
    };

    let config = config.apply_env_vars()?;
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "beadsync")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Get path to the project config file under `project_dir`
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE)
}

/// Load a TOML file as a config layer
///
/// # Errors
///
/// Returns error if:
/// - Path is a directory instead of a file
/// - File cannot be read
/// - TOML is malformed or has unknown keys
pub fn load_toml_file(path: &Path) -> Result<PartialConfig> {
    if path.is_dir() {
        return Err(Error::io_error(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io_error(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::parse_error(format!("Failed to parse config file {}: {e}", path.display()))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES
// ═══════════════════════════════════════════════════════════════════════════

impl Config {
    /// Apply `BEADSYNC_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparseable value
    pub fn apply_env_vars(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var("BEADSYNC_BD_PATH") {
            if value.trim().is_empty() {
                return Err(Error::invalid_config(
                    "BEADSYNC_BD_PATH cannot be empty - unset the variable or provide a program",
                ));
            }
            self.cli.bd_path = value;
        }

        if let Some(value) = env_override("BEADSYNC_TIMEOUT_MS")? {
            self.cli.timeout_ms = value;
        }
        if let Some(value) = env_override("BEADSYNC_RETRY_COUNT")? {
            self.cli.retry_count = value;
        }
        if let Some(value) = env_override("BEADSYNC_RETRY_BACKOFF_MS")? {
            self.cli.retry_backoff_ms = value;
        }
        if let Some(value) = env_override("BEADSYNC_OFFLINE_THRESHOLD_MS")? {
            self.cli.offline_threshold_ms = value;
        }
        if let Some(value) = env_override("BEADSYNC_WATCH_ENABLED")? {
            self.store.watch_enabled = value;
        }
        if let Some(value) = env_override("BEADSYNC_WATCH_DEBOUNCE_MS")? {
            self.store.watch_debounce_ms = value;
        }
        if let Some(value) = env_override("BEADSYNC_STALE_THRESHOLD_HOURS")? {
            self.store.stale_threshold_hours = value;
        }

        Ok(self)
    }
}

fn env_override<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name).ok().map_or(Ok(None), |value| {
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::invalid_config(format!("Invalid {name} value: {e}")))
    })
}
