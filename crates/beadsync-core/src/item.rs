//! Item data model
//!
//! An [`Item`] is one issue as reported by `bd list --json`. Parsing is
//! tolerant of the shapes different bd releases emit: dependencies may be
//! plain identifiers or edge objects, priorities may be integers or `"P2"`
//! strings, and list fields may be `null`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Deserializer, Serialize};

use crate::status::{normalize_status, IssueStatus};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Raw status text; see [`Item::status`] for the recognized value.
    #[serde(default)]
    pub status: String,
    #[serde(
        default,
        deserialize_with = "deserialize_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<u8>,
    /// Identifiers this item depends on, in reported order.
    #[serde(
        default,
        alias = "dependencies",
        deserialize_with = "deserialize_dependencies"
    )]
    pub depends_on: Vector<String>,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub labels: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// When the item last entered `in_progress`.
    #[serde(
        default,
        alias = "started_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub in_progress_since: Option<DateTime<Utc>>,
    /// Workspace target the item was loaded from, set by the snapshot store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: IssueStatus::Open.to_string(),
            priority: None,
            depends_on: Vector::new(),
            labels: BTreeSet::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            in_progress_since: None,
            workspace: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_in_progress_since(mut self, since: DateTime<Utc>) -> Self {
        self.in_progress_since = Some(since);
        self
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    #[must_use]
    pub const fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Recognized status, if the raw text normalizes to one.
    #[must_use]
    pub fn status(&self) -> Option<IssueStatus> {
        normalize_status(Some(&self.status))
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status() == Some(IssueStatus::InProgress)
    }

    #[must_use]
    pub fn depends_on(&self, id: &str) -> bool {
        self.depends_on.iter().any(|dep| dep == id)
    }

    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Time the item entered `in_progress`, falling back to its last update
    /// when bd did not record a start time.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.in_progress_since.or(self.updated_at)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DESERIALIZATION HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// One entry of a dependency list, in any of the shapes bd has emitted.
#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyRef {
    Id(String),
    Edge { depends_on_id: String },
    Issue { id: String },
}

impl DependencyRef {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Edge { depends_on_id: id } | Self::Issue { id } => id,
        }
    }
}

fn deserialize_dependencies<'de, D>(deserializer: D) -> Result<Vector<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs: Option<Vec<DependencyRef>> = Option::deserialize(deserializer)?;
    Ok(refs
        .into_iter()
        .flatten()
        .map(DependencyRef::into_id)
        .filter(|id| !id.trim().is_empty())
        .collect())
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let labels: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(labels.into_iter().flatten().collect())
}

fn deserialize_priority<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PriorityVisitor;

    impl serde::de::Visitor<'_> for PriorityVisitor {
        type Value = Option<u8>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a small integer, a string like \"P2\", or null")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u8::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("priority value out of range: {value}")))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u8::try_from(value)
                .map(Some)
                .map_err(|_| E::custom(format!("priority value out of range: {value}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let trimmed = value.trim();
            let digits = trimmed
                .strip_prefix('P')
                .or_else(|| trimmed.strip_prefix('p'))
                .unwrap_or(trimmed);
            digits
                .parse::<u8>()
                .map(Some)
                .map_err(|_| E::custom(format!("unknown priority: {value}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(PriorityVisitor)
}
