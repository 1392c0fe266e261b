//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: `~/.config/beadsync/config.toml`
//! 3. Project config: `.beadsync/config.toml`
//! 4. Environment variables: `BEADSYNC_*`
//! 5. CLI flags (command-specific)
//!
//! # Example Config
//!
//! ```toml
//! workspaces = ["../api", "../web"]
//!
//! [cli]
//! bd_path = "bd"
//! timeout_ms = 10000
//! retry_count = 1
//!
//! [store]
//! watch_debounce_ms = 250
//! stale_threshold_hours = 48
//! ```
//!
//! # Module Structure
//!
//! - `types`: Configuration structure definitions
//! - `defaults`: Default value implementations
//! - `load`: Loading from files and environment
//! - `merge`: Explicit-key layer merging
//! - `validate`: Range checks and projection onto runtime types

mod defaults;
mod load;
mod merge;
mod types;
mod validate;

#[cfg(test)]
#[allow(clippy::panic)]
mod tests_loading;
#[cfg(test)]
mod tests_validation;

pub use load::{
    global_config_path, load_config, load_config_from, load_toml_file, project_config_path,
    PROJECT_CONFIG_DIR,
};
pub use types::{
    CliConfig, Config, PartialCliConfig, PartialConfig, PartialStoreConfig, StoreConfig,
};
