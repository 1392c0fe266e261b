//! Error types for Beadsync
//!
//! Two layers:
//!
//! - [`CliError`]: what the bd process client surfaces. It carries a
//!   machine-checkable [`CliErrorKind`] next to a message that has already
//!   been scrubbed of workspace paths.
//! - [`Error`]: the crate-level error covering loading, watching,
//!   configuration and store lifecycle, wrapping [`CliError`] transparently.

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════
// CLI ERROR TAXONOMY
// ═══════════════════════════════════════════════════════════════════════════

/// Classification of a failed bd invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CliErrorKind {
    /// Argument failed sanitization; no process was started
    InvalidArgument,
    /// Retryable process error (connection reset and friends)
    Transient,
    /// A single attempt exceeded its time bound
    Timeout,
    /// Repeated timeouts beyond the cumulative offline threshold
    Offline,
    /// The process ran and reported failure, or its output was unusable
    Fatal,
}

impl CliErrorKind {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::Timeout)
    }
}

/// Error surfaced by the bd process client.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct CliError {
    pub kind: CliErrorKind,
    pub message: String,
}

impl CliError {
    pub fn new(kind: CliErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::InvalidArgument, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::Transient, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::Timeout, message)
    }

    pub fn offline(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::Offline, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::Fatal, message)
    }

    /// Same message, different classification.
    #[must_use]
    pub fn reclassify(self, kind: CliErrorKind) -> Self {
        Self { kind, ..self }
    }

    #[must_use]
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        Self {
            kind: self.kind,
            message: f(self.message),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CRATE ERROR
// ═══════════════════════════════════════════════════════════════════════════

/// Top-level error type for Beadsync operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// bd invocation failed
    #[error(transparent)]
    Cli(#[from] CliError),

    /// Loading one workspace target failed; the refresh was aborted
    #[error("Failed to load workspace '{target}': {source}")]
    Load {
        target: String,
        #[source]
        source: Box<Error>,
    },

    /// Registering a filesystem watch failed
    #[error("Watch error: {0}")]
    Watch(String),

    /// Configuration value out of range or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structured output or config text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Filesystem operation failed
    #[error("IO error: {0}")]
    Io(String),

    /// The snapshot store was disposed and no longer accepts refreshes
    #[error("Snapshot store has been disposed")]
    Disposed,
}

impl Error {
    pub fn load(target: impl Into<String>, source: Self) -> Self {
        Self::Load {
            target: target.into(),
            source: Box::new(source),
        }
    }

    pub fn watch(msg: impl Into<String>) -> Self {
        Self::Watch(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Classification of the underlying bd failure, if this error came from one.
    ///
    /// Front-ends use this to tell an offline tracker apart from a single
    /// failed call.
    #[must_use]
    pub fn cli_kind(&self) -> Option<CliErrorKind> {
        match self {
            Self::Cli(err) => Some(err.kind),
            Self::Load { source, .. } => source.cli_kind(),
            _ => None,
        }
    }
}

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_kebab_case() -> std::result::Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_value(CliErrorKind::InvalidArgument)?,
            serde_json::json!("invalid-argument")
        );
        assert_eq!(CliErrorKind::Offline.to_string(), "offline");
        Ok(())
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(CliErrorKind::Transient.is_retryable());
        assert!(CliErrorKind::Timeout.is_retryable());
        assert!(!CliErrorKind::Offline.is_retryable());
        assert!(!CliErrorKind::Fatal.is_retryable());
        assert!(!CliErrorKind::InvalidArgument.is_retryable());
    }

    #[test]
    fn test_reclassify_keeps_message() {
        let err = CliError::timeout("bd list timed out").reclassify(CliErrorKind::Offline);
        assert_eq!(err.kind, CliErrorKind::Offline);
        assert_eq!(err.message, "bd list timed out");
    }

    #[test]
    fn test_cli_error_is_transparent() {
        let err = Error::from(CliError::fatal("exit status 1"));
        assert_eq!(err.to_string(), "exit status 1");
        assert_eq!(err.cli_kind(), Some(CliErrorKind::Fatal));
        assert_eq!(Error::Disposed.cli_kind(), None);
    }

    #[test]
    fn test_load_error_keeps_cli_kind() {
        let err = Error::load("api", CliError::offline("bd appears to be offline").into());
        assert_eq!(err.cli_kind(), Some(CliErrorKind::Offline));
        assert_eq!(
            err.to_string(),
            "Failed to load workspace 'api': bd appears to be offline"
        );
    }
}
