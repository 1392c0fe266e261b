//! Default configuration values

use super::types::{CliConfig, StoreConfig};
use crate::{
    cli::{CliPolicy, DEFAULT_BD_PROGRAM},
    store::{DEFAULT_STALE_THRESHOLD_HOURS, DEFAULT_WATCH_DEBOUNCE_MS},
};

impl Default for CliConfig {
    fn default() -> Self {
        let policy = CliPolicy::DEFAULT;
        Self {
            bd_path: DEFAULT_BD_PROGRAM.to_string(),
            timeout_ms: policy.timeout_ms,
            retry_count: policy.retry_count,
            retry_backoff_ms: policy.retry_backoff_ms,
            offline_threshold_ms: policy.offline_threshold_ms,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            watch_enabled: true,
            watch_debounce_ms: DEFAULT_WATCH_DEBOUNCE_MS,
            stale_threshold_hours: DEFAULT_STALE_THRESHOLD_HOURS,
        }
    }
}
