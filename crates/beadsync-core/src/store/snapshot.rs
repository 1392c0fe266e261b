//! Immutable merged view of all loaded workspaces

use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    item::Item,
    status::IssueStatus,
    store::ordering::compare_ids,
};

/// Items from every workspace target, ordered by [`compare_ids`].
///
/// A snapshot is never mutated. The store swaps in a fresh one on each
/// successful reload, so readers holding an `Arc<Snapshot>` always see a
/// consistent set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    items: Vec<Item>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Number of items per recognized status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub closed: usize,
    /// Items whose status text is not recognized
    pub other: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.open + self.in_progress + self.blocked + self.closed + self.other
    }
}

impl Snapshot {
    /// The snapshot a store holds before its first successful load.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            loaded_at: None,
        }
    }

    /// Merge items and sort them by identifier.
    ///
    /// The sort is stable, so duplicate identifiers keep the order in which
    /// their workspaces were given.
    pub fn new(items: impl IntoIterator<Item = Item>, loaded_at: DateTime<Utc>) -> Self {
        let mut items: Vec<Item> = items.into_iter().collect();
        items.sort_by(|a, b| compare_ids(&a.id, &b.id));
        Self {
            items,
            loaded_at: Some(loaded_at),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// In-progress items whose start time is older than `threshold` at `now`.
    ///
    /// Items without any start or update time are never stale.
    #[must_use]
    pub fn stale_items(&self, now: DateTime<Utc>, threshold: TimeDelta) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| item.is_in_progress())
            .filter(|item| {
                item.started_at()
                    .is_some_and(|started| now.signed_duration_since(started) > threshold)
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn count_by_status(&self) -> StatusCounts {
        self.items
            .iter()
            .fold(StatusCounts::default(), |mut counts, item| {
                match item.status() {
                    Some(IssueStatus::Open) => counts.open += 1,
                    Some(IssueStatus::InProgress) => counts.in_progress += 1,
                    Some(IssueStatus::Blocked) => counts.blocked += 1,
                    Some(IssueStatus::Closed) => counts.closed += 1,
                    None => counts.other += 1,
                }
                counts
            })
    }

    /// Items grouped by recognized status in workflow order.
    ///
    /// Empty groups are omitted. Unrecognized statuses come last under `None`.
    #[must_use]
    pub fn grouped_by_status(&self) -> Vec<(Option<IssueStatus>, Vec<Item>)> {
        let mut groups = self
            .items
            .iter()
            .cloned()
            .map(|item| (item.status(), item))
            .into_group_map();

        IssueStatus::iter()
            .map(Some)
            .chain(std::iter::once(None))
            .sorted_by_key(|status| status.map_or(u32::MAX, IssueStatus::rank))
            .filter_map(|status| groups.remove(&status).map(|items| (status, items)))
            .collect()
    }
}
