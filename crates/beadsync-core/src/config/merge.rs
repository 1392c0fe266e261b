//! Configuration merging with explicit-key semantics
//!
//! Later layers override earlier ones, but only for keys they actually set.

use super::types::{
    CliConfig, Config, PartialCliConfig, PartialConfig, PartialStoreConfig, StoreConfig,
};

impl Config {
    /// Apply a file layer on top of this config.
    #[must_use]
    pub fn merge_partial(self, partial: PartialConfig) -> Self {
        Self {
            cli: match partial.cli {
                Some(cli) => self.cli.merge_partial(cli),
                None => self.cli,
            },
            store: match partial.store {
                Some(store) => self.store.merge_partial(store),
                None => self.store,
            },
            workspaces: partial.workspaces.unwrap_or(self.workspaces),
        }
    }
}

impl CliConfig {
    fn merge_partial(self, partial: PartialCliConfig) -> Self {
        Self {
            bd_path: partial.bd_path.unwrap_or(self.bd_path),
            timeout_ms: partial.timeout_ms.unwrap_or(self.timeout_ms),
            retry_count: partial.retry_count.unwrap_or(self.retry_count),
            retry_backoff_ms: partial.retry_backoff_ms.unwrap_or(self.retry_backoff_ms),
            offline_threshold_ms: partial
                .offline_threshold_ms
                .unwrap_or(self.offline_threshold_ms),
        }
    }
}

impl StoreConfig {
    fn merge_partial(self, partial: PartialStoreConfig) -> Self {
        Self {
            watch_enabled: partial.watch_enabled.unwrap_or(self.watch_enabled),
            watch_debounce_ms: partial.watch_debounce_ms.unwrap_or(self.watch_debounce_ms),
            stale_threshold_hours: partial
                .stale_threshold_hours
                .unwrap_or(self.stale_threshold_hours),
        }
    }
}
