//! Execution policy for the bd client

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeout, retry and offline-detection knobs for one client.
///
/// Immutable once handed to a client; build a new value to change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliPolicy {
    /// Bound on a single attempt.
    pub timeout_ms: u64,
    /// Additional attempts after the first for retryable failures.
    pub retry_count: u32,
    /// Pause between attempts.
    pub retry_backoff_ms: u64,
    /// Cumulative time after which a final timeout is reported as offline.
    pub offline_threshold_ms: u64,
}

impl CliPolicy {
    pub const DEFAULT: Self = Self {
        timeout_ms: 15_000,
        retry_count: 2,
        retry_backoff_ms: 500,
        offline_threshold_ms: 30_000,
    };

    #[must_use]
    pub const fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        Self { timeout_ms, ..self }
    }

    #[must_use]
    pub const fn with_retry_count(self, retry_count: u32) -> Self {
        Self {
            retry_count,
            ..self
        }
    }

    #[must_use]
    pub const fn with_retry_backoff_ms(self, retry_backoff_ms: u64) -> Self {
        Self {
            retry_backoff_ms,
            ..self
        }
    }

    #[must_use]
    pub const fn with_offline_threshold_ms(self, offline_threshold_ms: u64) -> Self {
        Self {
            offline_threshold_ms,
            ..self
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub const fn offline_threshold(&self) -> Duration {
        Duration::from_millis(self.offline_threshold_ms)
    }

    /// Total number of attempts a retryable failure may consume.
    pub const fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

impl Default for CliPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
