//! Configuration validation and projection onto runtime types

use super::types::Config;
use crate::{
    cli::CliPolicy,
    error::{Error, Result},
    store::StoreOptions,
};

const MAX_RETRY_COUNT: u32 = 10;
const MAX_WATCH_DEBOUNCE_MS: u64 = 60_000;

impl Config {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.cli.bd_path.trim().is_empty() {
            return Err(Error::invalid_config("cli.bd_path cannot be empty"));
        }

        if self.cli.timeout_ms == 0 {
            return Err(Error::invalid_config("cli.timeout_ms must be at least 1"));
        }

        if self.cli.retry_count > MAX_RETRY_COUNT {
            return Err(Error::invalid_config(format!(
                "cli.retry_count must be 0-{MAX_RETRY_COUNT}"
            )));
        }

        if !(1..=MAX_WATCH_DEBOUNCE_MS).contains(&self.store.watch_debounce_ms) {
            return Err(Error::invalid_config(format!(
                "store.watch_debounce_ms must be 1-{MAX_WATCH_DEBOUNCE_MS}"
            )));
        }

        if self.store.stale_threshold_hours == 0 {
            return Err(Error::invalid_config(
                "store.stale_threshold_hours must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Execution policy for the bd client.
    pub const fn cli_policy(&self) -> CliPolicy {
        CliPolicy {
            timeout_ms: self.cli.timeout_ms,
            retry_count: self.cli.retry_count,
            retry_backoff_ms: self.cli.retry_backoff_ms,
            offline_threshold_ms: self.cli.offline_threshold_ms,
        }
    }

    /// Options for the snapshot store, using the system clock.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default()
            .with_watch_debounce_ms(self.store.watch_debounce_ms)
            .with_stale_threshold_hours(self.store.stale_threshold_hours)
    }
}
