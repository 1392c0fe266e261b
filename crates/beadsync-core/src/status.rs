//! Status policy
//!
//! Pure functions over the closed set of statuses the front-end recognizes.
//! Transitions are deliberately permissive: any recognized status other
//! than the current one is a valid target. Workflow ordering, if wanted,
//! belongs to the caller.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl IssueStatus {
    /// Display grouping rank: open first, closed last.
    #[must_use]
    pub const fn rank(self) -> u32 {
        match self {
            Self::Open => 0,
            Self::InProgress => 1,
            Self::Blocked => 2,
            Self::Closed => 3,
        }
    }

    /// Human label, e.g. `In Progress`.
    #[must_use]
    pub fn label(self) -> String {
        self.as_ref()
            .split('_')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Why a status change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("'{0}' is not a valid status")]
    InvalidTarget(String),

    #[error("Issue is already {}", .0.label())]
    AlreadyInStatus(IssueStatus),
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Trim, lowercase and match against the recognized statuses.
#[must_use]
pub fn normalize_status(value: Option<&str>) -> Option<IssueStatus> {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| v.parse().ok())
}

/// Check that `target` is a recognized status different from `current`.
///
/// `current` may be absent or unrecognized; in that case every recognized
/// target is allowed.
pub fn validate_transition(
    current: Option<&str>,
    target: &str,
) -> Result<IssueStatus, TransitionError> {
    let next = normalize_status(Some(target))
        .ok_or_else(|| TransitionError::InvalidTarget(target.to_string()))?;

    if normalize_status(current) == Some(next) {
        return Err(TransitionError::AlreadyInStatus(next));
    }

    Ok(next)
}

/// Rank of a raw status; unrecognized or absent statuses sort last.
#[must_use]
pub fn status_rank(status: Option<&str>) -> u32 {
    normalize_status(status).map_or(u32::MAX, IssueStatus::rank)
}

/// Comparator for grouping items by status.
#[must_use]
pub fn compare_status(a: Option<&str>, b: Option<&str>) -> Ordering {
    status_rank(a).cmp(&status_rank(b))
}

/// Label for display; unrecognized input is returned verbatim.
#[must_use]
pub fn format_status_label(value: &str) -> String {
    normalize_status(Some(value)).map_or_else(|| value.to_string(), IssueStatus::label)
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPER FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
