//! Configuration type definitions
//!
//! Plain data holders. Behavior lives in the sibling modules.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

/// Root configuration structure
///
/// Loaded from defaults → global → project → env vars → CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub cli: CliConfig,
    pub store: StoreConfig,
    /// Workspace roots to load when none are given on the command line.
    pub workspaces: Vec<PathBuf>,
}

// ═══════════════════════════════════════════════════════════════════════════
// NESTED CONFIGURATION STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    /// Program used to invoke bd.
    pub bd_path: String,
    pub timeout_ms: u64,
    pub retry_count: u32,
    pub retry_backoff_ms: u64,
    pub offline_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub watch_enabled: bool,
    pub watch_debounce_ms: u64,
    pub stale_threshold_hours: u64,
}

// ═══════════════════════════════════════════════════════════════════════════
// PARTIAL CONFIGURATION (FILE LAYERS)
// ═══════════════════════════════════════════════════════════════════════════

/// A config file layer.
///
/// Only keys present in the TOML are `Some`, so a file that sets one value
/// does not reset the others to their defaults when merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub cli: Option<PartialCliConfig>,
    #[serde(default)]
    pub store: Option<PartialStoreConfig>,
    #[serde(default)]
    pub workspaces: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialCliConfig {
    #[serde(default)]
    pub bd_path: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry_count: Option<u32>,
    #[serde(default)]
    pub retry_backoff_ms: Option<u64>,
    #[serde(default)]
    pub offline_threshold_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialStoreConfig {
    #[serde(default)]
    pub watch_enabled: Option<bool>,
    #[serde(default)]
    pub watch_debounce_ms: Option<u64>,
    #[serde(default)]
    pub stale_threshold_hours: Option<u64>,
}
